//! About Us API Handlers

use axum::extract::State;

use crate::api::{ApiResult, ValidatedJson};
use crate::core::ServerState;
use crate::db::repository::about_us;
use shared::ApiResponse;
use shared::models::{AboutUs, AboutUsUpdate};

/// GET /api/about
pub async fn get(State(state): State<ServerState>) -> ApiResult<AboutUs> {
    let about = about_us::get(&state.pool).await?;
    Ok(ApiResponse::success(about))
}

/// PUT /api/about
pub async fn update(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<AboutUsUpdate>,
) -> ApiResult<AboutUs> {
    let about = about_us::upsert(&state.pool, payload).await?;
    Ok(ApiResponse::success_with_message("About page updated", about))
}
