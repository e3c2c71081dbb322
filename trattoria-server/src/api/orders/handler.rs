//! Order API Handlers
//!
//! Checkout turns the user's cart into a `pending` order. Stock was already
//! reserved by the cart, so checkout keeps it and cancellation gives it back.

use axum::extract::State;
use http::StatusCode;

use crate::api::{ApiQuery, ApiResult, AppJson, Id, ValidatedJson, created};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db;
use crate::db::repository::cart::{self, CartKey};
use crate::db::repository::order::{self, NewOrder};
use crate::db::repository::{RepoError, coupon, product};
use crate::pricing;
use shared::models::{
    CheckoutRequest, DeliveryType, Order, OrderQuery, OrderStatus, OrderStatusUpdate,
    PaymentStatusUpdate,
};
use shared::{ApiResponse, AppError, ErrorCode, PageRequest, PaginatedResponse};

async fn load(state: &ServerState, id: i64) -> Result<Order, AppError> {
    order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))
}

/// Load an order the caller owns (admins see every order)
async fn load_visible(state: &ServerState, user: &CurrentUser, id: i64) -> Result<Order, AppError> {
    let order = load(state, id).await?;
    if order.user_id != user.id && !user.is_admin() {
        return Err(AppError::forbidden("You can only access your own orders"));
    }
    Ok(order)
}

fn invalid_transition(from: OrderStatus, to: OrderStatus) -> AppError {
    AppError::with_message(
        ErrorCode::OrderInvalidTransition,
        format!("Cannot change order from {} to {}", from.as_str(), to.as_str()),
    )
    .with_detail("from", from.as_str())
    .with_detail("to", to.as_str())
}

/// Cancel and put every line's quantity back on the shelf
async fn cancel_and_restock(state: &ServerState, order: &Order) -> Result<Order, AppError> {
    let mut tx = db::begin_write(&state.pool).await?;
    if !order::transition_status(&mut *tx, order.id, order.status, OrderStatus::Cancelled).await? {
        return Err(AppError::with_message(
            ErrorCode::OrderNotCancellable,
            "Order status changed, reload and retry",
        ));
    }
    for item in &order.items {
        product::release_stock(&mut *tx, item.product_id, item.quantity).await?;
    }
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(order_id = order.id, lines = order.items.len(), "Order cancelled, stock restored");
    load(state, order.id).await
}

/// POST /api/orders/checkout
pub async fn checkout(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CheckoutRequest>,
) -> Result<(StatusCode, ApiResponse<Order>), AppError> {
    let address = payload
        .delivery_address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    if payload.delivery_type == DeliveryType::Delivery && address.is_none() {
        return Err(AppError::new(ErrorCode::DeliveryAddressRequired));
    }
    let coupon_code = payload
        .coupon_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut tx = db::begin_write(&state.pool).await?;

    let cart = cart::find(&mut *tx, &CartKey::User(current.id))
        .await?
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::CartEmpty))?;

    let applied = match coupon_code {
        Some(code) => {
            let found = coupon::find_by_code(&mut *tx, code)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::CouponNotFound))?;
            let used = coupon::count_user_usages(&mut *tx, found.id, current.id).await?;
            let quote = pricing::quote(&found, cart.subtotal, used, shared::util::now_millis())?;
            Some((found, quote))
        }
        None => None,
    };

    let created_order = order::create(
        &mut tx,
        NewOrder {
            user_id: current.id,
            items: &cart.items,
            subtotal: cart.subtotal,
            discount: applied.as_ref().map_or(0, |(_, q)| q.discount),
            coupon_code: applied.as_ref().map(|(c, _)| c.code.as_str()),
            payment_method: payload.payment_method,
            delivery_type: payload.delivery_type,
            delivery_address: address,
            notes: payload.notes.as_deref(),
        },
    )
    .await?;

    if let Some((used_coupon, quote)) = &applied
        && !coupon::record_usage(
            &mut tx,
            used_coupon.id,
            current.id,
            created_order.id,
            quote.discount,
        )
        .await?
    {
        return Err(AppError::new(ErrorCode::CouponUsageLimitReached));
    }

    cart::delete(&mut *tx, cart.id).await?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        order_id = created_order.id,
        user_id = current.id,
        total = created_order.total,
        coupon = ?created_order.coupon_code,
        "Order placed"
    );
    Ok(created("Order placed", created_order))
}

/// GET /api/orders/mine
pub async fn mine(State(state): State<ServerState>, current: CurrentUser) -> ApiResult<Vec<Order>> {
    let orders = order::find_by_user(&state.pool, current.id).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Id(id): Id,
) -> ApiResult<Order> {
    let found = load_visible(&state, &current, id).await?;
    Ok(ApiResponse::success(found))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    current: CurrentUser,
    Id(id): Id,
) -> ApiResult<Order> {
    let found = load_visible(&state, &current, id).await?;
    if !found.status.is_cancellable() {
        return Err(AppError::with_message(
            ErrorCode::OrderNotCancellable,
            format!("Order is {} and can no longer be cancelled", found.status.as_str()),
        ));
    }
    let cancelled = cancel_and_restock(&state, &found).await?;
    Ok(ApiResponse::success_with_message("Order cancelled", cancelled))
}

/// GET /api/orders?status=&page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> ApiResult<PaginatedResponse<Order>> {
    let page = PageRequest::from_query(query.page, query.limit);
    let (orders, total) = order::list(&state.pool, query.status, &page).await?;
    Ok(ApiResponse::success(PaginatedResponse::new(
        orders, total, page.page, page.limit,
    )))
}

/// PUT /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Id(id): Id,
    AppJson(payload): AppJson<OrderStatusUpdate>,
) -> ApiResult<Order> {
    let found = load(&state, id).await?;
    if !found.status.can_transition_to(payload.status) {
        return Err(invalid_transition(found.status, payload.status));
    }

    let updated = if payload.status == OrderStatus::Cancelled {
        cancel_and_restock(&state, &found).await?
    } else {
        if !order::transition_status(&state.pool, id, found.status, payload.status).await? {
            return Err(invalid_transition(found.status, payload.status));
        }
        load(&state, id).await?
    };

    tracing::info!(
        order_id = id,
        from = found.status.as_str(),
        to = payload.status.as_str(),
        "Order status changed"
    );
    Ok(ApiResponse::success_with_message("Order status updated", updated))
}

/// PUT /api/orders/{id}/payment
pub async fn update_payment(
    State(state): State<ServerState>,
    Id(id): Id,
    AppJson(payload): AppJson<PaymentStatusUpdate>,
) -> ApiResult<Order> {
    if !order::update_payment_status(&state.pool, id, payload.payment_status).await? {
        return Err(AppError::new(ErrorCode::OrderNotFound));
    }
    let updated = load(&state, id).await?;
    Ok(ApiResponse::success_with_message("Payment status updated", updated))
}
