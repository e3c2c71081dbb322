//! Contact API Handlers

use axum::extract::State;
use http::StatusCode;

use crate::api::{ApiQuery, ApiResult, AppJson, Id, ValidatedJson, created};
use crate::core::ServerState;
use crate::db::repository::contact;
use shared::models::{Contact, ContactCreate, ContactQuery, ContactStatusUpdate};
use shared::{ApiResponse, AppError, ErrorCode};

/// POST /api/contact
pub async fn submit(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<ContactCreate>,
) -> Result<(StatusCode, ApiResponse<Contact>), AppError> {
    let message = contact::create(&state.pool, payload).await?;
    tracing::info!(contact_id = message.id, "Contact message received");
    Ok(created("Message sent", message))
}

/// GET /api/contact?status=
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<ContactQuery>,
) -> ApiResult<Vec<Contact>> {
    let messages = contact::list(&state.pool, query.status).await?;
    Ok(ApiResponse::success(messages))
}

/// PUT /api/contact/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Id(id): Id,
    AppJson(payload): AppJson<ContactStatusUpdate>,
) -> ApiResult<Contact> {
    let updated = contact::update_status(&state.pool, id, payload.status).await?;
    Ok(ApiResponse::success_with_message("Status updated", updated))
}

/// DELETE /api/contact/{id}
pub async fn delete(State(state): State<ServerState>, Id(id): Id) -> ApiResult<()> {
    if !contact::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::ContactNotFound));
    }
    Ok(ApiResponse::ok("Message deleted"))
}
