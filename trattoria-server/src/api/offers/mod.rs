//! Offer API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/offers | GET | none (live offers) |
//! | /api/offers/{id} | GET | none |
//! | /api/offers/all | GET | admin |
//! | /api/offers | POST | admin |
//! | /api/offers/{id} | PUT, DELETE | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/api/offers", get(handler::list_live))
        .route("/api/offers/{id}", get(handler::get_by_id));

    let admin = Router::new()
        .route("/api/offers/all", get(handler::list_all))
        .route("/api/offers", post(handler::create))
        .route("/api/offers/{id}", put(handler::update).delete(handler::delete))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(admin)
}
