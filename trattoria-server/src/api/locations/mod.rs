//! Location API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/locations | GET | none |
//! | /api/locations/{id} | GET | none |
//! | /api/locations | POST | admin |
//! | /api/locations/{id} | PUT, DELETE | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/api/locations", get(handler::list))
        .route("/api/locations/{id}", get(handler::get_by_id));

    let admin = Router::new()
        .route("/api/locations", post(handler::create))
        .route("/api/locations/{id}", put(handler::update).delete(handler::delete))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(admin)
}
