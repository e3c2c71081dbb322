//! Request authentication
//!
//! The session token is read from the `Authorization: Bearer` header or the
//! `token` cookie, validated, and resolved against the users table so that
//! role changes and deactivation apply immediately.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use http::HeaderMap;
use shared::models::{User, UserRole};
use shared::{AppError, ErrorCode};

use crate::auth::cookie::{SESSION_COOKIE, read_cookie};
use crate::auth::{JwtError, JwtService};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;

/// Authenticated user attached to a request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session token from the Bearer header, falling back to the cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .map(str::to_string)
        .or_else(|| read_cookie(headers, SESSION_COOKIE))
}

/// Validate a session token and load its active user
pub async fn authenticate(state: &ServerState, token: &str) -> Result<CurrentUser, AppError> {
    let claims = state.jwt_service.validate_access_token(token).map_err(|e| {
        security_log!("WARN", "auth_failed", error = e.to_string());
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed token subject"))?;

    let user = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| {
            security_log!("WARN", "auth_unknown_user", user_id = user_id);
            AppError::invalid_token("Unknown user")
        })?;

    if !user.is_active {
        security_log!("WARN", "auth_inactive_user", user_id = user_id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    Ok(CurrentUser::from(&user))
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_auth`
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let Some(token) = session_token(&parts.headers) else {
            security_log!("WARN", "auth_missing", uri = parts.uri.path().to_string());
            return Err(AppError::not_authenticated());
        };

        let user = authenticate(state, &token).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// `Option<CurrentUser>`: a missing or unusable token means a guest
impl OptionalFromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(Some(user.clone()));
        }
        let Some(token) = session_token(&parts.headers) else {
            return Ok(None);
        };
        match authenticate(state, &token).await {
            Ok(user) => {
                parts.extensions.insert(user.clone());
                Ok(Some(user))
            }
            Err(e) if e.code == ErrorCode::DatabaseError => Err(e),
            Err(_) => Ok(None),
        }
    }
}
