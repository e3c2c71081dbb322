//! Authentication middleware
//!
//! `require_auth` resolves the session into a [`CurrentUser`] request
//! extension; `require_admin` must be layered inside it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::{AppError, ErrorCode};

use crate::auth::CurrentUser;
use crate::auth::extractor::{authenticate, session_token};
use crate::core::ServerState;
use crate::security_log;

/// Reject requests without a valid session
///
/// | failure | status |
/// |---------|--------|
/// | no token | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | bad token / unknown user | 401 TokenInvalid |
/// | deactivated account | 403 AccountDisabled |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let Some(token) = session_token(req.headers()) else {
        security_log!("WARN", "auth_missing", uri = req.uri().path().to_string());
        return Err(AppError::not_authenticated());
    };

    let user = authenticate(&state, &token).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Reject authenticated users that are not admins
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            uri = req.uri().path().to_string()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(next.run(req).await)
}
