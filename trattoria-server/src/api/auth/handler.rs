//! Authentication API Handlers

use axum::extract::State;
use http::{HeaderMap, StatusCode, header::SET_COOKIE};

use crate::api::two_factor::verify_second_factor;
use crate::api::{ApiResult, ValidatedJson, cart::merge_guest_cart, created};
use crate::auth::cookie::{CART_COOKIE, SESSION_COOKIE, build_cookie, clear_cookie};
use crate::auth::password::{hash_password, verify_account_password};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, user};
use crate::security_log;
use shared::models::{
    LoginRequest, LoginResponse, RegisterRequest, TwoFactorLogin, User, UserProfile, UserRole,
};
use shared::{ApiResponse, AppError, ErrorCode};

/// Issue the session cookie, merge any guest cart and build the response
async fn start_session(
    state: &ServerState,
    request_headers: &HeaderMap,
    user: &User,
) -> Result<(HeaderMap, LoginResponse), AppError> {
    let token = state.jwt_service.generate_token(user).map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "Failed to sign session token");
        AppError::internal("Failed to create session")
    })?;

    let secure = state.secure_cookies();
    let mut headers = HeaderMap::new();
    let session_cookie = build_cookie(
        SESSION_COOKIE,
        &token,
        state.jwt_service.session_max_age(),
        secure,
    )
    .map_err(|e| AppError::internal(format!("Invalid session cookie: {e}")))?;
    headers.append(SET_COOKIE, session_cookie);

    if merge_guest_cart(state, request_headers, user.id).await? {
        let cleared = clear_cookie(CART_COOKIE, secure)
            .map_err(|e| AppError::internal(format!("Invalid cart cookie: {e}")))?;
        headers.append(SET_COOKIE, cleared);
    }

    Ok((headers, LoginResponse::session(UserProfile::from(user), token)))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<ServerState>,
    headers: HeaderMap,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, ApiResponse<LoginResponse>), AppError> {
    let hash = hash_password(&payload.password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AppError::internal("Failed to hash password")
    })?;

    let created_user = user::create(
        &state.pool,
        user::NewUser {
            name: payload.name.trim(),
            email: &payload.email,
            password_hash: Some(&hash),
            role: UserRole::Client,
            phone: payload.phone.as_deref(),
            allergies: &payload.allergies,
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::EmailAlreadyRegistered),
        other => other.into(),
    })?;

    tracing::info!(user_id = created_user.id, "User registered");
    let (cookies, body) = start_session(&state, &headers, &created_user).await?;
    let (status, body) = created("Registration successful", body);
    Ok((status, cookies, body))
}

/// POST /api/auth/login
///
/// Accounts with 2FA get a pending token instead of a session.
pub async fn login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<(HeaderMap, ApiResponse<LoginResponse>), AppError> {
    let found = user::find_by_email(&state.pool, &payload.email).await?;

    let stored_hash = found.as_ref().and_then(|u| u.password_hash.as_deref());
    let verified = verify_account_password(&payload.password, stored_hash);
    let Some(account) = found.filter(|_| verified) else {
        security_log!("WARN", "login_failed", email = payload.email);
        return Err(AppError::invalid_credentials());
    };

    if !account.is_active {
        security_log!("WARN", "login_disabled_account", user_id = account.id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    if account.two_factor_enabled {
        let pending = state
            .jwt_service
            .generate_pending_token(&account)
            .map_err(|e| AppError::internal(format!("Failed to sign pending token: {e}")))?;
        return Ok((
            HeaderMap::new(),
            ApiResponse::success_with_message(
                "Two-factor verification required",
                LoginResponse::pending(pending),
            ),
        ));
    }

    let (cookies, body) = start_session(&state, &headers, &account).await?;
    security_log!("INFO", "login_success", user_id = account.id);
    Ok((cookies, ApiResponse::success_with_message("Login successful", body)))
}

/// POST /api/auth/2fa/verify-login
pub async fn verify_login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    ValidatedJson(payload): ValidatedJson<TwoFactorLogin>,
) -> Result<(HeaderMap, ApiResponse<LoginResponse>), AppError> {
    let claims = state
        .jwt_service
        .validate_pending_token(&payload.pending_token)
        .map_err(|e| {
            security_log!("WARN", "2fa_pending_token_rejected", error = e);
            AppError::invalid_token("Login session expired, please sign in again")
        })?;
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed token subject"))?;

    let account = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::invalid_token("Unknown user"))?;
    if !account.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    if !account.two_factor_enabled {
        return Err(AppError::new(ErrorCode::TwoFactorNotEnabled));
    }

    verify_second_factor(&state, &account, &payload.code).await?;

    let (cookies, body) = start_session(&state, &headers, &account).await?;
    security_log!("INFO", "login_success_2fa", user_id = account.id);
    Ok((cookies, ApiResponse::success_with_message("Login successful", body)))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<ServerState>) -> Result<(HeaderMap, ApiResponse<()>), AppError> {
    let cookie = clear_cookie(SESSION_COOKIE, state.secure_cookies())
        .map_err(|e| AppError::internal(format!("Invalid session cookie: {e}")))?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((headers, ApiResponse::ok("Logged out")))
}

/// GET /api/auth/me
pub async fn me(State(state): State<ServerState>, current: CurrentUser) -> ApiResult<UserProfile> {
    let account = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success(UserProfile::from(&account)))
}
