//! Coupon API Handlers

use axum::extract::State;
use http::StatusCode;

use crate::api::{ApiResult, Id, ValidatedJson, created, duplicate_as};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::coupon;
use crate::pricing;
use shared::models::{
    Coupon, CouponCreate, CouponQuote, CouponUpdate, CouponUsage, CouponValidateRequest,
};
use shared::{ApiResponse, AppError, ErrorCode};

async fn load(state: &ServerState, id: i64) -> Result<Coupon, AppError> {
    coupon::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CouponNotFound))
}

/// POST /api/coupons/validate
///
/// Quotes the discount for the caller without redeeming the coupon.
pub async fn validate(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CouponValidateRequest>,
) -> ApiResult<CouponQuote> {
    let found = coupon::find_by_code(&state.pool, &payload.code)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CouponNotFound))?;
    let used = coupon::count_user_usages(&state.pool, found.id, current.id).await?;
    let quote = pricing::quote(&found, payload.subtotal, used, shared::util::now_millis())?;
    Ok(ApiResponse::success(quote))
}

/// GET /api/coupons
pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<Coupon>> {
    let coupons = coupon::find_all(&state.pool).await?;
    Ok(ApiResponse::success(coupons))
}

/// GET /api/coupons/{id}
pub async fn get_by_id(State(state): State<ServerState>, Id(id): Id) -> ApiResult<Coupon> {
    Ok(ApiResponse::success(load(&state, id).await?))
}

/// POST /api/coupons
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<CouponCreate>,
) -> Result<(StatusCode, ApiResponse<Coupon>), AppError> {
    let created_coupon = coupon::create(&state.pool, payload)
        .await
        .map_err(duplicate_as(ErrorCode::CouponCodeExists))?;
    tracing::info!(coupon_id = created_coupon.id, code = %created_coupon.code, "Coupon created");
    Ok(created("Coupon created", created_coupon))
}

/// PUT /api/coupons/{id}
pub async fn update(
    State(state): State<ServerState>,
    Id(id): Id,
    ValidatedJson(payload): ValidatedJson<CouponUpdate>,
) -> ApiResult<Coupon> {
    let updated = coupon::update(&state.pool, id, payload)
        .await
        .map_err(duplicate_as(ErrorCode::CouponCodeExists))?;
    Ok(ApiResponse::success_with_message("Coupon updated", updated))
}

/// DELETE /api/coupons/{id}
pub async fn delete(State(state): State<ServerState>, Id(id): Id) -> ApiResult<()> {
    if !coupon::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::CouponNotFound));
    }
    Ok(ApiResponse::ok("Coupon deleted"))
}

/// GET /api/coupons/{id}/usages
pub async fn usages(State(state): State<ServerState>, Id(id): Id) -> ApiResult<Vec<CouponUsage>> {
    load(&state, id).await?;
    let usages = coupon::find_usages(&state.pool, id).await?;
    Ok(ApiResponse::success(usages))
}
