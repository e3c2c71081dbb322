//! Reservation API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/reservations | POST | user |
//! | /api/reservations/mine | GET | user |
//! | /api/reservations/{id} | GET | owner or admin |
//! | /api/reservations/{id}/cancel | POST | owner or admin |
//! | /api/reservations/{id}/pay | POST | owner |
//! | /api/reservations | GET | admin |
//! | /api/reservations/{id}/status | PUT | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let user = Router::new()
        .route("/api/reservations", post(handler::create))
        .route("/api/reservations/mine", get(handler::mine))
        .route("/api/reservations/{id}", get(handler::get_by_id))
        .route("/api/reservations/{id}/cancel", post(handler::cancel))
        .route("/api/reservations/{id}/pay", post(handler::pay))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/reservations", get(handler::list))
        .route("/api/reservations/{id}/status", put(handler::update_status))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    user.merge(admin)
}
