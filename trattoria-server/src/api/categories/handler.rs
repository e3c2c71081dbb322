//! Category API Handlers

use axum::extract::State;
use http::StatusCode;

use crate::api::{ApiResult, Id, ValidatedJson, created, duplicate_as};
use crate::core::ServerState;
use crate::db::repository::category;
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::{ApiResponse, AppError, ErrorCode};

/// GET /api/categories
pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<Category>> {
    let categories = category::find_all(&state.pool).await?;
    Ok(ApiResponse::success(categories))
}

/// GET /api/categories/{id}
pub async fn get_by_id(State(state): State<ServerState>, Id(id): Id) -> ApiResult<Category> {
    let found = category::find_by_id(&state.pool, id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
    Ok(ApiResponse::success(found))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<CategoryCreate>,
) -> Result<(StatusCode, ApiResponse<Category>), AppError> {
    let category = category::create(&state.pool, payload)
        .await
        .map_err(duplicate_as(ErrorCode::CategoryNameExists))?;
    tracing::info!(category_id = category.id, name = %category.name, "Category created");
    Ok(created("Category created", category))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    Id(id): Id,
    ValidatedJson(payload): ValidatedJson<CategoryUpdate>,
) -> ApiResult<Category> {
    let category = category::update(&state.pool, id, payload)
        .await
        .map_err(duplicate_as(ErrorCode::CategoryNameExists))?;
    Ok(ApiResponse::success_with_message("Category updated", category))
}

/// DELETE /api/categories/{id} (soft delete)
pub async fn delete(State(state): State<ServerState>, Id(id): Id) -> ApiResult<()> {
    if !category::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::CategoryNotFound));
    }
    Ok(ApiResponse::ok("Category deleted"))
}
