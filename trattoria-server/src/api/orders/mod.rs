//! Order API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/orders/checkout | POST | user |
//! | /api/orders/mine | GET | user |
//! | /api/orders/{id} | GET | owner or admin |
//! | /api/orders/{id}/cancel | POST | owner or admin |
//! | /api/orders | GET | admin |
//! | /api/orders/{id}/status | PUT | admin |
//! | /api/orders/{id}/payment | PUT | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let user = Router::new()
        .route("/api/orders/checkout", post(handler::checkout))
        .route("/api/orders/mine", get(handler::mine))
        .route("/api/orders/{id}", get(handler::get_by_id))
        .route("/api/orders/{id}/cancel", post(handler::cancel))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/orders", get(handler::list))
        .route("/api/orders/{id}/status", put(handler::update_status))
        .route("/api/orders/{id}/payment", put(handler::update_payment))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    user.merge(admin)
}
