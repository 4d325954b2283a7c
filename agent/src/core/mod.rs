//! Deterministic, pure logic shared by the agent.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod canned;
pub mod classifier;
pub mod evaluator;
pub mod schedule;
pub mod types;
