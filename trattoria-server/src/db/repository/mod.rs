//! Repository Module
//!
//! Async query functions per table. Single-statement functions are generic
//! over the executor so they run against the pool or inside a transaction;
//! multi-statement ones take a connection and expect the caller's transaction.

pub mod about_us;
pub mod area;
pub mod cart;
pub mod category;
pub mod contact;
pub mod counter;
pub mod coupon;
pub mod location;
pub mod offer;
pub mod order;
pub mod product;
pub mod reservation;
pub mod review;
pub mod user;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row".to_string()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database operation failed");
                AppError::database(msg)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// In-memory pool with migrations applied, for repository tests
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    crate::db::DbService::new(":memory:")
        .await
        .expect("in-memory database")
        .pool
}
