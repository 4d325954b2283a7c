//! Model-backed agents for study planning and step execution.

pub mod executor;
pub mod planner;
