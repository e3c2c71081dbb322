//! Coupon API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/coupons/validate | POST | user |
//! | /api/coupons | GET, POST | admin |
//! | /api/coupons/{id} | GET, PUT, DELETE | admin |
//! | /api/coupons/{id}/usages | GET | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let user = Router::new()
        .route("/api/coupons/validate", post(handler::validate))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/coupons", get(handler::list).post(handler::create))
        .route(
            "/api/coupons/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/api/coupons/{id}/usages", get(handler::usages))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    user.merge(admin)
}
