//! Authentication and authorization
//!
//! - [`JwtService`] - session and pending-2FA tokens
//! - [`CurrentUser`] - the authenticated user of a request
//! - [`require_auth`] / [`require_admin`] - route guards
//! - [`password`], [`totp`] - credential primitives
//! - [`RateLimiter`] - per-IP limits on credential routes

pub mod cookie;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod totp;

pub use extractor::CurrentUser;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
pub use rate_limit::RateLimiter;
