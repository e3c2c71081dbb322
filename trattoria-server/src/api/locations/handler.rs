//! Location API Handlers

use axum::extract::State;
use http::StatusCode;

use crate::api::{ApiResult, Id, ValidatedJson, created};
use crate::core::ServerState;
use crate::db::repository::location;
use shared::models::{Location, LocationCreate, LocationUpdate};
use shared::{ApiResponse, AppError, ErrorCode};

/// GET /api/locations
pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<Location>> {
    let locations = location::find_all(&state.pool).await?;
    Ok(ApiResponse::success(locations))
}

/// GET /api/locations/{id}
pub async fn get_by_id(State(state): State<ServerState>, Id(id): Id) -> ApiResult<Location> {
    let found = location::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::LocationNotFound))?;
    Ok(ApiResponse::success(found))
}

/// POST /api/locations
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<LocationCreate>,
) -> Result<(StatusCode, ApiResponse<Location>), AppError> {
    let created_location = location::create(&state.pool, payload).await?;
    tracing::info!(location_id = created_location.id, city = %created_location.city, "Location created");
    Ok(created("Location created", created_location))
}

/// PUT /api/locations/{id}
pub async fn update(
    State(state): State<ServerState>,
    Id(id): Id,
    ValidatedJson(payload): ValidatedJson<LocationUpdate>,
) -> ApiResult<Location> {
    let updated = location::update(&state.pool, id, payload).await?;
    Ok(ApiResponse::success_with_message("Location updated", updated))
}

/// DELETE /api/locations/{id} (soft delete)
pub async fn delete(State(state): State<ServerState>, Id(id): Id) -> ApiResult<()> {
    if !location::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::LocationNotFound));
    }
    Ok(ApiResponse::ok("Location deleted"))
}
