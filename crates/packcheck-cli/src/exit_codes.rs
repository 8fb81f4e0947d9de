//! Process exit codes. Part of the public contract for scripts and CI.

pub const SUCCESS: i32 = 0;
pub const INVALID_PACK: i32 = 1; // Validation ran and found violations
pub const CONFIG_ERROR: i32 = 2; // Bad policy file or arguments
