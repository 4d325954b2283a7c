//! Stable exit codes for `mom-agent` commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed with a config, I/O, network, or other runtime error.
pub const FAILURE: i32 = 1;
/// Live mode was selected but the API key variable is unset or empty.
pub const MISSING_CREDENTIAL: i32 = 2;
