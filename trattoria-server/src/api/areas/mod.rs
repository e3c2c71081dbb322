//! Area API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/areas | GET | none (`include_inactive` for admins) |
//! | /api/areas/{id} | GET | none |
//! | /api/areas/{id}/availability | GET | none |
//! | /api/areas | POST | admin |
//! | /api/areas/{id} | PUT, DELETE | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/api/areas", get(handler::list))
        .route("/api/areas/{id}", get(handler::get_by_id))
        .route("/api/areas/{id}/availability", get(handler::availability));

    let admin = Router::new()
        .route("/api/areas", post(handler::create))
        .route("/api/areas/{id}", put(handler::update).delete(handler::delete))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(admin)
}
