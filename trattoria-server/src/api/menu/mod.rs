//! Menu API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/menu | GET | none (`include_inactive` for admins) |
//! | /api/menu/allergy-safe | GET | user |
//! | /api/menu/{id} | GET | none |
//! | /api/menu | POST | admin |
//! | /api/menu/{id} | PUT, DELETE | admin |
//! | /api/menu/{id}/stock | PATCH | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/api/menu", get(handler::list))
        .route("/api/menu/{id}", get(handler::get_by_id));

    let user = Router::new()
        .route("/api/menu/allergy-safe", get(handler::allergy_safe))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/menu", post(handler::create))
        .route("/api/menu/{id}", put(handler::update).delete(handler::delete))
        .route("/api/menu/{id}/stock", patch(handler::adjust_stock))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(user).merge(admin)
}
