//! Offer API Handlers
//!
//! `original_price` is the sum of the referenced products' current prices
//! times their quantities, fixed when the offer is written.

use axum::extract::State;
use http::StatusCode;
use validator::ValidationError;

use crate::api::{ApiResult, Id, ValidatedJson, created};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{offer, product};
use shared::models::{
    MAX_AMOUNT, Offer, OfferCreate, OfferItem, OfferUpdate, OfferView, check_offer_items,
    check_offer_window,
};
use shared::{ApiResponse, AppError, ErrorCode};

fn rule_error(err: ValidationError) -> AppError {
    let message = err
        .message
        .map(|m| m.to_string())
        .unwrap_or_else(|| err.code.to_string());
    AppError::validation(message)
}

/// Price the bundle at today's menu prices
async fn original_price(state: &ServerState, items: &[OfferItem]) -> Result<i64, AppError> {
    let mut total: i64 = 0;
    for item in items {
        let found = product::find_by_id(&state.pool, item.product_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ProductNotFound,
                    format!("Product {} does not exist", item.product_id),
                )
                .with_detail("product_id", item.product_id)
            })?;
        total = found
            .price
            .checked_mul(item.quantity)
            .and_then(|line| total.checked_add(line))
            .filter(|sum| *sum <= MAX_AMOUNT)
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::ValueOutOfRange, "Offer total is out of range")
                    .with_detail("max", MAX_AMOUNT)
            })?;
    }
    Ok(total)
}

fn ensure_discounted(offer_price: i64, original_price: i64) -> Result<(), AppError> {
    if offer_price >= original_price {
        return Err(AppError::with_message(
            ErrorCode::OfferInvalidPrice,
            "Offer price must be lower than the original price",
        )
        .with_detail("offer_price", offer_price)
        .with_detail("original_price", original_price));
    }
    Ok(())
}

/// GET /api/offers
pub async fn list_live(State(state): State<ServerState>) -> ApiResult<Vec<OfferView>> {
    let offers = offer::find_live(&state.pool, shared::util::now_millis()).await?;
    Ok(ApiResponse::success(offers.into_iter().map(OfferView::from).collect()))
}

/// GET /api/offers/all
pub async fn list_all(State(state): State<ServerState>) -> ApiResult<Vec<OfferView>> {
    let offers = offer::find_all(&state.pool).await?;
    Ok(ApiResponse::success(offers.into_iter().map(OfferView::from).collect()))
}

/// GET /api/offers/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    viewer: Option<CurrentUser>,
    Id(id): Id,
) -> ApiResult<OfferView> {
    let is_admin = viewer.as_ref().is_some_and(CurrentUser::is_admin);
    let found = offer::find_by_id(&state.pool, id)
        .await?
        .filter(|o| o.is_active || is_admin)
        .ok_or_else(|| AppError::new(ErrorCode::OfferNotFound))?;
    Ok(ApiResponse::success(found.into()))
}

/// POST /api/offers
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<OfferCreate>,
) -> Result<(StatusCode, ApiResponse<OfferView>), AppError> {
    let original = original_price(&state, &payload.items).await?;
    ensure_discounted(payload.offer_price, original)?;

    let created_offer = offer::create(&state.pool, &payload, original).await?;
    tracing::info!(
        offer_id = created_offer.id,
        original_price = original,
        offer_price = created_offer.offer_price,
        "Offer created"
    );
    Ok(created("Offer created", created_offer.into()))
}

/// PUT /api/offers/{id}
pub async fn update(
    State(state): State<ServerState>,
    Id(id): Id,
    ValidatedJson(payload): ValidatedJson<OfferUpdate>,
) -> ApiResult<OfferView> {
    let mut merged: Offer = offer::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OfferNotFound))?;

    if let Some(title) = payload.title {
        merged.title = title.trim().to_string();
    }
    if payload.description.is_some() {
        merged.description = payload.description;
    }
    if let Some(items) = payload.items {
        merged.items = items;
    }
    if let Some(price) = payload.offer_price {
        merged.offer_price = price;
    }
    merged.valid_from = payload.valid_from.unwrap_or(merged.valid_from);
    merged.valid_until = payload.valid_until.unwrap_or(merged.valid_until);
    if payload.image_url.is_some() {
        merged.image_url = payload.image_url;
    }
    merged.is_active = payload.is_active.unwrap_or(merged.is_active);

    check_offer_window(merged.valid_from, merged.valid_until).map_err(rule_error)?;
    check_offer_items(&merged.items).map_err(rule_error)?;
    merged.original_price = original_price(&state, &merged.items).await?;
    ensure_discounted(merged.offer_price, merged.original_price)?;

    let saved = offer::save(&state.pool, &merged).await?;
    Ok(ApiResponse::success_with_message("Offer updated", saved.into()))
}

/// DELETE /api/offers/{id} (soft delete)
pub async fn delete(State(state): State<ServerState>, Id(id): Id) -> ApiResult<()> {
    if !offer::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::OfferNotFound));
    }
    Ok(ApiResponse::ok("Offer deleted"))
}
