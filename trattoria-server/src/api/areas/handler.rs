//! Area API Handlers

use axum::extract::State;
use http::StatusCode;
use serde::Deserialize;

use crate::api::{ApiQuery, ApiResult, Id, ValidatedJson, created, duplicate_as};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{area, reservation};
use shared::models::{Area, AreaCreate, AreaUpdate, Availability, AvailabilityQuery};
use shared::{ApiResponse, AppError, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct AreaListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/areas
pub async fn list(
    State(state): State<ServerState>,
    viewer: Option<CurrentUser>,
    ApiQuery(query): ApiQuery<AreaListQuery>,
) -> ApiResult<Vec<Area>> {
    let include_inactive =
        query.include_inactive && viewer.as_ref().is_some_and(CurrentUser::is_admin);
    let areas = area::find_all(&state.pool, include_inactive).await?;
    Ok(ApiResponse::success(areas))
}

/// GET /api/areas/{id}
pub async fn get_by_id(State(state): State<ServerState>, Id(id): Id) -> ApiResult<Area> {
    let found = area::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AreaNotFound))?;
    Ok(ApiResponse::success(found))
}

/// GET /api/areas/{id}/availability?start=&end=
pub async fn availability(
    State(state): State<ServerState>,
    Id(id): Id,
    ApiQuery(query): ApiQuery<AvailabilityQuery>,
) -> ApiResult<Availability> {
    if query.end <= query.start {
        return Err(AppError::with_message(
            ErrorCode::ReservationInvalidRange,
            "end must be after start",
        ));
    }
    area::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AreaNotFound))?;

    let conflicts = reservation::find_conflicts(&state.pool, id, query.start, query.end).await?;
    Ok(ApiResponse::success(Availability {
        area_id: id,
        available: conflicts.is_empty(),
        conflicts,
    }))
}

/// POST /api/areas
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<AreaCreate>,
) -> Result<(StatusCode, ApiResponse<Area>), AppError> {
    let created_area = area::create(&state.pool, payload)
        .await
        .map_err(duplicate_as(ErrorCode::AreaNameExists))?;
    tracing::info!(area_id = created_area.id, name = %created_area.name, "Area created");
    Ok(created("Area created", created_area))
}

/// PUT /api/areas/{id}
pub async fn update(
    State(state): State<ServerState>,
    Id(id): Id,
    ValidatedJson(payload): ValidatedJson<AreaUpdate>,
) -> ApiResult<Area> {
    let updated = area::update(&state.pool, id, payload)
        .await
        .map_err(duplicate_as(ErrorCode::AreaNameExists))?;
    Ok(ApiResponse::success_with_message("Area updated", updated))
}

/// DELETE /api/areas/{id} (soft delete)
pub async fn delete(State(state): State<ServerState>, Id(id): Id) -> ApiResult<()> {
    if !area::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::AreaNotFound));
    }
    Ok(ApiResponse::ok("Area deleted"))
}
