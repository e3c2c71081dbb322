//! User API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/users/me | PUT | user |
//! | /api/users/me/password | PUT | user |
//! | /api/users | GET | admin |
//! | /api/users/{id} | GET, DELETE | admin |
//! | /api/users/{id}/role | PUT | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let own = Router::new()
        .route("/api/users/me", put(handler::update_me))
        .route("/api/users/me/password", put(handler::change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/users", get(handler::list))
        .route("/api/users/{id}", get(handler::get_by_id).delete(handler::deactivate))
        .route("/api/users/{id}/role", put(handler::update_role))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    own.merge(admin)
}
