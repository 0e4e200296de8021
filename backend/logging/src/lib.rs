//! Logging setup for Narrator binaries.

pub mod logger;

pub use logger::{build_filter, init_logger, LOG_FILE_PREFIX};
