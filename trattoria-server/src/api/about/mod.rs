//! About Us API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/about | GET | none |
//! | /api/about | PUT | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new().route("/api/about", get(handler::get));

    let admin = Router::new()
        .route("/api/about", put(handler::update))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(admin)
}
