//! User API Handlers

use axum::extract::State;

use crate::api::{ApiQuery, ApiResult, AppJson, Id, ValidatedJson};
use crate::auth::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use shared::models::{PasswordChange, ProfileUpdate, RoleUpdate, UserProfile};
use shared::{ApiResponse, AppError, ErrorCode, PageQuery, PageRequest, PaginatedResponse};

/// PUT /api/users/me
pub async fn update_me(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ProfileUpdate>,
) -> ApiResult<UserProfile> {
    let updated = user::update_profile(&state.pool, current.id, &payload).await?;
    Ok(ApiResponse::success_with_message(
        "Profile updated",
        UserProfile::from(&updated),
    ))
}

/// PUT /api/users/me/password
pub async fn change_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<PasswordChange>,
) -> ApiResult<()> {
    let account = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let current_ok = account
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&payload.current_password, hash));
    if !current_ok {
        security_log!("WARN", "password_change_rejected", user_id = account.id);
        return Err(AppError::with_message(
            ErrorCode::InvalidCredentials,
            "Current password is incorrect",
        ));
    }

    let hash = hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    user::update_password(&state.pool, account.id, &hash).await?;
    security_log!("INFO", "password_changed", user_id = account.id);

    Ok(ApiResponse::ok("Password changed"))
}

/// GET /api/users
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<PaginatedResponse<UserProfile>> {
    let page = PageRequest::from(query);
    let (users, total) = user::list(&state.pool, &page).await?;
    let profiles = users.iter().map(UserProfile::from).collect();
    Ok(ApiResponse::success(PaginatedResponse::new(
        profiles, total, page.page, page.limit,
    )))
}

/// GET /api/users/{id}
pub async fn get_by_id(State(state): State<ServerState>, Id(id): Id) -> ApiResult<UserProfile> {
    let account = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success(UserProfile::from(&account)))
}

/// PUT /api/users/{id}/role
pub async fn update_role(
    State(state): State<ServerState>,
    current: CurrentUser,
    Id(id): Id,
    AppJson(payload): AppJson<RoleUpdate>,
) -> ApiResult<UserProfile> {
    if id == current.id {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }
    let updated = user::update_role(&state.pool, id, payload.role).await?;
    security_log!(
        "INFO",
        "role_changed",
        admin_id = current.id,
        user_id = id,
        role = payload.role.as_str()
    );
    Ok(ApiResponse::success_with_message(
        "Role updated",
        UserProfile::from(&updated),
    ))
}

/// DELETE /api/users/{id} (soft delete)
pub async fn deactivate(
    State(state): State<ServerState>,
    current: CurrentUser,
    Id(id): Id,
) -> ApiResult<()> {
    if id == current.id {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }
    if !user::deactivate(&state.pool, id).await? {
        return Err(AppError::not_found("User"));
    }
    security_log!("INFO", "user_deactivated", admin_id = current.id, user_id = id);
    Ok(ApiResponse::ok("User deactivated"))
}
