//! Two-factor authentication API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/auth/2fa/setup | POST | user |
//! | /api/auth/2fa/enable | POST | user |
//! | /api/auth/2fa/disable | POST | user |
//! | /api/auth/2fa/backup-codes | POST | user |

mod handler;

pub(crate) use handler::verify_second_factor;

use axum::{Router, middleware, routing::post};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/auth/2fa/setup", post(handler::setup))
        .route("/api/auth/2fa/enable", post(handler::enable))
        .route("/api/auth/2fa/disable", post(handler::disable))
        .route("/api/auth/2fa/backup-codes", post(handler::regenerate_backup_codes))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
