//! Category API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/categories | GET | none |
//! | /api/categories | POST | admin |
//! | /api/categories/{id} | GET | none |
//! | /api/categories/{id} | PUT, DELETE | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/api/categories", get(handler::list))
        .route("/api/categories/{id}", get(handler::get_by_id));

    let admin = Router::new()
        .route("/api/categories", post(handler::create))
        .route("/api/categories/{id}", put(handler::update).delete(handler::delete))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(admin)
}
