//! Trattoria server
//!
//! REST API for a restaurant: menu, cart and checkout, table-area
//! reservations, coupons, reviews and the content pages.
//!
//! ```text
//! trattoria-server/src/
//! ├── core/       # config, state, server
//! ├── auth/       # JWT sessions, passwords, TOTP, guards, rate limits
//! ├── db/         # SQLite pool and repositories
//! ├── pricing/    # coupon and reservation rules
//! ├── services/   # Cloudinary client
//! ├── api/        # routers and handlers
//! └── utils/      # logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod pricing;
pub mod services;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use shared::{ApiResponse, AppError, AppResult, ErrorCode};

/// Security event on the `security` target
///
/// ```ignore
/// security_log!("WARN", "auth_failed", email = email, ip = ip);
/// ```
#[macro_export]
macro_rules! security_log {
    ("WARN", $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(target: "security", event = $event, $($key = %$value),*)
    };
    ("ERROR", $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::error!(target: "security", event = $event, $($key = %$value),*)
    };
    ("INFO", $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(target: "security", event = $event, $($key = %$value),*)
    };
}

/// Load `.env` and initialize logging from the configuration
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    utils::init_logger_with_file(
        &config.log_level,
        config.log_json,
        config.log_dir.as_deref(),
    )
}
