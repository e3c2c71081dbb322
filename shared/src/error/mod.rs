//! Unified error system for Trattoria
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: The `{success, message, data}` response envelope
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors (including 2FA)
//! - 2xxx: Permission errors
//! - 3xxx: Menu errors
//! - 4xxx: Cart and order errors
//! - 5xxx: Coupon errors
//! - 6xxx: Area and reservation errors
//! - 7xxx: Content errors (reviews, locations, offers, contact)
//! - 8xxx: Upload errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::NotFound);
//! let err = AppError::with_message(ErrorCode::ValidationFailed, "Invalid email format");
//! let err = AppError::validation("Missing required field").with_detail("field", "email");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert!(!response.success);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
