//! Study helper and reminder scheduler with a warm persona.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure logic (reminder evaluation, step classification, canned
//!   content). No I/O, fully testable in isolation.
//! - **[`io`]**: Side effects (config, the interaction log, notifications, the
//!   chat model, subprocesses). Isolated behind traits for test doubles.
//!
//! Orchestration modules ([`agents`], [`study`], [`reminders`]) combine the
//! two to implement CLI commands and the web UI.

pub mod agents;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod reminders;
pub mod study;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
