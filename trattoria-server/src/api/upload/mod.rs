//! Image Upload API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/upload | POST | admin |

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/upload", post(handler::upload))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
