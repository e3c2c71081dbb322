//! Menu API Handlers

use axum::extract::State;
use http::StatusCode;

use crate::api::{ApiQuery, ApiResult, AppJson, Id, ValidatedJson, created};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{category, product, user};
use shared::models::{
    MAX_QUANTITY, MenuQuery, Product, ProductCreate, ProductUpdate, StockAdjust,
};
use shared::{ApiResponse, AppError, ErrorCode};

/// Products may only reference an active category
async fn ensure_category(state: &ServerState, name: &str) -> Result<(), AppError> {
    if category::is_active_name(&state.pool, name.trim()).await? {
        return Ok(());
    }
    Err(AppError::validation(format!("Category '{}' does not exist", name.trim()))
        .with_detail("category", name.trim()))
}

/// GET /api/menu?category=&search=&include_inactive=
pub async fn list(
    State(state): State<ServerState>,
    viewer: Option<CurrentUser>,
    ApiQuery(mut query): ApiQuery<MenuQuery>,
) -> ApiResult<Vec<Product>> {
    if !viewer.as_ref().is_some_and(CurrentUser::is_admin) {
        query.include_inactive = false;
    }
    let products = product::find_all(&state.pool, &query).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/menu/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    viewer: Option<CurrentUser>,
    Id(id): Id,
) -> ApiResult<Product> {
    let is_admin = viewer.as_ref().is_some_and(CurrentUser::is_admin);
    let found = product::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.is_active || is_admin)
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    Ok(ApiResponse::success(found))
}

/// GET /api/menu/allergy-safe
///
/// Active products with no ingredient matching the user's allergies.
pub async fn allergy_safe(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> ApiResult<Vec<Product>> {
    let account = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    let products = product::find_all(&state.pool, &MenuQuery::default()).await?;
    let safe: Vec<Product> = products
        .into_iter()
        .filter(|p| !p.contains_any_allergen(&account.allergies))
        .collect();
    Ok(ApiResponse::success(safe))
}

/// POST /api/menu
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<ProductCreate>,
) -> Result<(StatusCode, ApiResponse<Product>), AppError> {
    ensure_category(&state, &payload.category).await?;
    let created_product = product::create(&state.pool, payload).await?;
    tracing::info!(product_id = created_product.id, name = %created_product.name, "Menu item created");
    Ok(created("Menu item created", created_product))
}

/// PUT /api/menu/{id}
pub async fn update(
    State(state): State<ServerState>,
    Id(id): Id,
    ValidatedJson(payload): ValidatedJson<ProductUpdate>,
) -> ApiResult<Product> {
    if let Some(name) = &payload.category {
        ensure_category(&state, name).await?;
    }
    let updated = product::update(&state.pool, id, payload).await?;
    Ok(ApiResponse::success_with_message("Menu item updated", updated))
}

/// PATCH /api/menu/{id}/stock
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Id(id): Id,
    AppJson(payload): AppJson<StockAdjust>,
) -> ApiResult<Product> {
    if product::adjust_stock(&state.pool, id, payload.delta).await?.is_none() {
        let existing = product::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Stock must stay between 0 and {MAX_QUANTITY}"),
        )
        .with_detail("stock", existing.stock)
        .with_detail("delta", payload.delta));
    }
    let updated = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    tracing::info!(product_id = id, delta = payload.delta, stock = updated.stock, "Stock adjusted");
    Ok(ApiResponse::success_with_message("Stock updated", updated))
}

/// DELETE /api/menu/{id} (soft delete)
pub async fn delete(State(state): State<ServerState>, Id(id): Id) -> ApiResult<()> {
    if !product::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::ProductNotFound));
    }
    Ok(ApiResponse::ok("Menu item deleted"))
}
