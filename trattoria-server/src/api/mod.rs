//! HTTP API
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`auth`] - register, login, second factor, logout, current user
//! - [`two_factor`] - TOTP setup and backup codes
//! - [`users`] - profile and admin user management
//! - [`categories`], [`menu`] - the menu
//! - [`cart`], [`orders`] - ordering
//! - [`areas`], [`reservations`] - table-area booking
//! - [`coupons`], [`reviews`]
//! - [`locations`], [`offers`], [`contact`], [`about`] - content pages
//! - [`upload`] - image upload to Cloudinary
//!
//! Every response uses the `{success, message, data}` envelope.

pub mod extract;

pub mod about;
pub mod areas;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod contact;
pub mod coupons;
pub mod health;
pub mod locations;
pub mod menu;
pub mod offers;
pub mod orders;
pub mod reservations;
pub mod reviews;
pub mod two_factor;
pub mod upload;
pub mod users;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue, Method, StatusCode, header};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::db::repository::RepoError;
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

pub use extract::{ApiQuery, AppJson, Id, ValidatedJson};

/// Handler result carrying the response envelope
pub type ApiResult<T> = AppResult<ApiResponse<T>>;

/// Request body ceiling; multipart uploads need room above the 5 MiB image cap
const BODY_LIMIT: usize = 6 * 1024 * 1024;

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// 201 with the envelope
pub fn created<T>(message: &str, data: T) -> (StatusCode, ApiResponse<T>) {
    (
        StatusCode::CREATED,
        ApiResponse::success_with_message(message, data),
    )
}

/// Report unique-constraint failures under a resource specific code
pub(crate) fn duplicate_as(code: ErrorCode) -> impl Fn(RepoError) -> AppError {
    move |e| match e {
        RepoError::Duplicate(msg) => AppError::with_message(code, msg),
        other => other.into(),
    }
}

/// All resource routers, without global middleware
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(two_factor::router(state))
        .merge(users::router(state))
        .merge(categories::router(state))
        .merge(menu::router(state))
        .merge(cart::router())
        .merge(orders::router(state))
        .merge(areas::router(state))
        .merge(reservations::router(state))
        .merge(coupons::router(state))
        .merge(reviews::router(state))
        .merge(locations::router(state))
        .merge(offers::router(state))
        .merge(contact::router(state))
        .merge(about::router(state))
        .merge(upload::router(state))
}

/// Fully layered application, used by the server and by integration tests
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    let cors = cors_layer(&state.config.cors_origins);

    build_router(&state)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(axum_middleware::from_fn(crate::utils::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(REQUEST_ID.clone()))
        .layer(SetRequestIdLayer::new(REQUEST_ID.clone(), MakeRequestUuid))
        .with_state(state)
}

/// Explicit origins with credentials; unparsable origins are skipped
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, REQUEST_ID.clone()])
        .max_age(Duration::from_secs(3600))
}

async fn not_found() -> AppError {
    AppError::with_message(ErrorCode::NotFound, "Route not found")
}
