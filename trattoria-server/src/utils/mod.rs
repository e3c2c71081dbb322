//! Utilities
//!
//! - [`logger`] - tracing subscriber setup and log retention
//! - [`request_log`] - per-request logging middleware

pub mod logger;
pub mod request_log;

pub use logger::init_logger_with_file;
pub use request_log::logging_middleware;
