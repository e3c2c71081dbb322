//! Review API Handlers

use axum::extract::State;
use http::StatusCode;

use crate::api::{ApiQuery, ApiResult, Id, ValidatedJson, created, duplicate_as};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{area, location, product, review};
use shared::models::{
    Review, ReviewCreate, ReviewList, ReviewQuery, ReviewSummary, ReviewTargetType,
};
use shared::{ApiResponse, AppError, ErrorCode};

/// Whether the reviewed menu item, area or location exists and is active
async fn target_exists(
    state: &ServerState,
    target_type: ReviewTargetType,
    target_id: i64,
) -> Result<bool, AppError> {
    let exists = match target_type {
        ReviewTargetType::Menu => product::find_by_id(&state.pool, target_id)
            .await?
            .is_some_and(|p| p.is_active),
        ReviewTargetType::Area => area::find_by_id(&state.pool, target_id)
            .await?
            .is_some_and(|a| a.is_active),
        ReviewTargetType::Location => location::find_by_id(&state.pool, target_id)
            .await?
            .is_some_and(|l| l.is_active),
    };
    Ok(exists)
}

/// GET /api/reviews?target_type=&target_id=
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> ApiResult<ReviewList> {
    let reviews = review::list(&state.pool, &query).await?;
    let summary = ReviewSummary::from_reviews(&reviews);
    Ok(ApiResponse::success(ReviewList { reviews, summary }))
}

/// POST /api/reviews
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ReviewCreate>,
) -> Result<(StatusCode, ApiResponse<Review>), AppError> {
    if !target_exists(&state, payload.target_type, payload.target_id).await? {
        return Err(AppError::new(ErrorCode::ReviewTargetNotFound)
            .with_detail("target_id", payload.target_id));
    }
    let created_review = review::create(&state.pool, current.id, &current.name, &payload)
        .await
        .map_err(duplicate_as(ErrorCode::ReviewAlreadyExists))?;
    Ok(created("Review added", created_review))
}

/// DELETE /api/reviews/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Id(id): Id,
) -> ApiResult<()> {
    let found = review::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ReviewNotFound))?;
    if found.user_id != current.id && !current.is_admin() {
        return Err(AppError::forbidden("You can only delete your own reviews"));
    }
    review::delete(&state.pool, id).await?;
    Ok(ApiResponse::ok("Review deleted"))
}
