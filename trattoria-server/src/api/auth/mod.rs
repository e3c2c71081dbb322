//! Authentication API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/auth/register | POST | none, rate limited |
//! | /api/auth/login | POST | none, rate limited |
//! | /api/auth/2fa/verify-login | POST | pending token, rate limited |
//! | /api/auth/logout | POST | none |
//! | /api/auth/me | GET | user |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit, two_factor_rate_limit};
use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route(
            "/api/auth/register",
            post(handler::register)
                .layer(middleware::from_fn_with_state(state.clone(), register_rate_limit)),
        )
        .route(
            "/api/auth/login",
            post(handler::login)
                .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit)),
        )
        .route(
            "/api/auth/2fa/verify-login",
            post(handler::verify_login)
                .layer(middleware::from_fn_with_state(state.clone(), two_factor_rate_limit)),
        )
        .route("/api/auth/logout", post(handler::logout));

    let protected = Router::new()
        .route("/api/auth/me", get(handler::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected)
}
