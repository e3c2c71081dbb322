//! Review API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/reviews | GET | none |
//! | /api/reviews | POST | user |
//! | /api/reviews/{id} | DELETE | author or admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new().route("/api/reviews", get(handler::list));

    let user = Router::new()
        .route("/api/reviews", post(handler::create))
        .route("/api/reviews/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(user)
}
