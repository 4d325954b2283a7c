//! I/O helpers: configuration, the interaction log, and external ports.

pub mod config;
pub mod init;
pub mod input;
pub mod interaction_log;
pub mod model;
pub mod notifier;
pub mod process;
pub mod prompt;
