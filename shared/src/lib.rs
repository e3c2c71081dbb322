//! Shared types for Trattoria
//!
//! Domain models, the error system and the response envelope used by the
//! server and by API consumers.

pub mod error;
pub mod models;
pub mod query;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use query::{PageQuery, PageRequest, PaginatedResponse};
