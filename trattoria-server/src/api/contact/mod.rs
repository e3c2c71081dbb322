//! Contact API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/contact | POST | none |
//! | /api/contact | GET | admin |
//! | /api/contact/{id} | DELETE | admin |
//! | /api/contact/{id}/status | PUT | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new().route("/api/contact", post(handler::submit));

    let admin = Router::new()
        .route("/api/contact", get(handler::list))
        .route("/api/contact/{id}", delete(handler::delete))
        .route("/api/contact/{id}/status", put(handler::update_status))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(admin)
}
