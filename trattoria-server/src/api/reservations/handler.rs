//! Reservation API Handlers
//!
//! Booking rules are checked against the area row, then the overlap check
//! and the insert run as one conditional statement inside a transaction.

use axum::extract::State;
use http::StatusCode;

use crate::api::{ApiQuery, ApiResult, AppJson, Id, ValidatedJson, created};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db;
use crate::db::repository::reservation::{self, NewReservation};
use crate::db::repository::{RepoError, area};
use crate::pricing;
use shared::models::{
    Reservation, ReservationCreate, ReservationQuery, ReservationStatus, ReservationStatusUpdate,
};
use shared::{ApiResponse, AppError, ErrorCode};

async fn load(state: &ServerState, id: i64) -> Result<Reservation, AppError> {
    reservation::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ReservationNotFound))
}

async fn load_visible(
    state: &ServerState,
    user: &CurrentUser,
    id: i64,
) -> Result<Reservation, AppError> {
    let found = load(state, id).await?;
    if found.user_id != user.id && !user.is_admin() {
        return Err(AppError::forbidden("You can only access your own reservations"));
    }
    Ok(found)
}

fn invalid_transition(from: ReservationStatus, to: ReservationStatus) -> AppError {
    AppError::with_message(
        ErrorCode::ReservationInvalidTransition,
        format!("Cannot change reservation from {} to {}", from.as_str(), to.as_str()),
    )
    .with_detail("from", from.as_str())
    .with_detail("to", to.as_str())
}

/// Compare-and-set the status, then return the fresh row
async fn transition(
    state: &ServerState,
    found: &Reservation,
    to: ReservationStatus,
) -> Result<Reservation, AppError> {
    if !reservation::transition_status(&state.pool, found.id, found.status, to).await? {
        return Err(invalid_transition(found.status, to));
    }
    tracing::info!(
        reservation_id = found.id,
        from = found.status.as_str(),
        to = to.as_str(),
        "Reservation status changed"
    );
    Ok(reservation::reload(&state.pool, found.id).await?)
}

/// POST /api/reservations
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ReservationCreate>,
) -> Result<(StatusCode, ApiResponse<Reservation>), AppError> {
    let mut tx = db::begin_write(&state.pool).await?;

    let booked_area = area::find_by_id(&mut *tx, payload.area_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AreaNotFound))?;
    let price = pricing::check_booking(
        &booked_area,
        payload.start_time,
        payload.end_time,
        payload.guests,
        shared::util::now_millis(),
    )?;

    let booked = reservation::create_if_free(
        &mut tx,
        NewReservation {
            user_id: current.id,
            area_id: booked_area.id,
            start_time: payload.start_time,
            end_time: payload.end_time,
            guests: payload.guests,
            price,
            notes: payload.notes.as_deref(),
        },
    )
    .await?
    .ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ReservationOverlap,
            "The area is already booked for part of this time",
        )
        .with_detail("area_id", booked_area.id)
    })?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        reservation_id = booked.id,
        area_id = booked.area_id,
        user_id = current.id,
        price = booked.price,
        "Reservation created"
    );
    Ok(created("Reservation created", booked))
}

/// GET /api/reservations/mine
pub async fn mine(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> ApiResult<Vec<Reservation>> {
    let reservations = reservation::find_by_user(&state.pool, current.id).await?;
    Ok(ApiResponse::success(reservations))
}

/// GET /api/reservations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Id(id): Id,
) -> ApiResult<Reservation> {
    let found = load_visible(&state, &current, id).await?;
    Ok(ApiResponse::success(found))
}

/// POST /api/reservations/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    current: CurrentUser,
    Id(id): Id,
) -> ApiResult<Reservation> {
    let found = load_visible(&state, &current, id).await?;
    if !found.status.is_cancellable() {
        return Err(AppError::with_message(
            ErrorCode::ReservationNotCancellable,
            format!("Reservation is {} and cannot be cancelled", found.status.as_str()),
        ));
    }
    let cancelled = transition(&state, &found, ReservationStatus::Cancelled).await?;
    Ok(ApiResponse::success_with_message("Reservation cancelled", cancelled))
}

/// POST /api/reservations/{id}/pay
pub async fn pay(
    State(state): State<ServerState>,
    current: CurrentUser,
    Id(id): Id,
) -> ApiResult<Reservation> {
    let found = load(&state, id).await?;
    if found.user_id != current.id {
        return Err(AppError::forbidden("You can only pay for your own reservations"));
    }
    if found.status != ReservationStatus::Pending {
        return Err(invalid_transition(found.status, ReservationStatus::Paid));
    }
    let paid = transition(&state, &found, ReservationStatus::Paid).await?;
    Ok(ApiResponse::success_with_message("Reservation paid", paid))
}

/// GET /api/reservations?area_id=&status=
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<ReservationQuery>,
) -> ApiResult<Vec<Reservation>> {
    let reservations = reservation::list(&state.pool, &query).await?;
    Ok(ApiResponse::success(reservations))
}

/// PUT /api/reservations/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Id(id): Id,
    AppJson(payload): AppJson<ReservationStatusUpdate>,
) -> ApiResult<Reservation> {
    let found = load(&state, id).await?;
    if !found.status.can_transition_to(payload.status) {
        return Err(invalid_transition(found.status, payload.status));
    }
    let updated = transition(&state, &found, payload.status).await?;
    Ok(ApiResponse::success_with_message("Reservation status updated", updated))
}
