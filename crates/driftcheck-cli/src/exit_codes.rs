//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.
//! Drift itself is not an error: a completed run exits with `SUCCESS`.

/// Success - the run completed, whether or not drift was found
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - missing or unusable startup input
pub const CONFIG_ERROR: i32 = 2;

/// Cluster error - connection or version detection failed before any target ran
pub const CLUSTER_ERROR: i32 = 3;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
