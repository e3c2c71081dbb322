//! Cart API Handlers
//!
//! Stock is reserved when a line is added or grown and released when it
//! shrinks or is removed. The stock update and the cart write share one
//! transaction.

use axum::extract::State;
use http::{HeaderMap, header::SET_COOKIE};
use sqlx::SqliteConnection;

use crate::api::{ApiResult, AppJson, Id};
use crate::auth::CurrentUser;
use crate::auth::cookie::{CART_COOKIE, CART_COOKIE_MAX_AGE, build_cookie, read_cookie};
use crate::core::ServerState;
use crate::db;
use crate::db::repository::cart::{self, CartKey};
use crate::db::repository::{RepoError, product};
use shared::models::{AddCartItem, Cart, MAX_QUANTITY, UpdateCartItem};
use shared::{ApiResponse, AppError, ErrorCode};

/// Guest session id from the cookie, if it is a UUID
fn guest_session(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, CART_COOKIE).filter(|v| uuid::Uuid::parse_str(v).is_ok())
}

/// Existing owner of the request's cart, if any
fn existing_key(user: Option<&CurrentUser>, headers: &HeaderMap) -> Option<CartKey> {
    match user {
        Some(user) => Some(CartKey::User(user.id)),
        None => guest_session(headers).map(CartKey::Session),
    }
}

/// Owner for a write; a new guest session also yields its `Set-Cookie`
fn owner_for_write(
    state: &ServerState,
    user: Option<&CurrentUser>,
    headers: &HeaderMap,
) -> Result<(CartKey, HeaderMap), AppError> {
    let mut response_headers = HeaderMap::new();
    if let Some(key) = existing_key(user, headers) {
        return Ok((key, response_headers));
    }
    let session = uuid::Uuid::new_v4().to_string();
    let cookie = build_cookie(
        CART_COOKIE,
        &session,
        CART_COOKIE_MAX_AGE,
        state.secure_cookies(),
    )
    .map_err(|e| AppError::internal(format!("Invalid cart cookie: {e}")))?;
    response_headers.insert(SET_COOKIE, cookie);
    Ok((CartKey::Session(session), response_headers))
}

fn check_quantity(quantity: i64) -> Result<(), AppError> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("Quantity must be between 1 and {MAX_QUANTITY}"),
        ));
    }
    Ok(())
}

fn empty_cart(key: Option<CartKey>) -> Cart {
    match key {
        Some(CartKey::User(id)) => Cart::empty(Some(id), None),
        Some(CartKey::Session(s)) => Cart::empty(None, Some(s)),
        None => Cart::empty(None, None),
    }
}

/// Reserve stock, telling a missing or withdrawn product apart from a short one
async fn reserve(conn: &mut SqliteConnection, product_id: i64, quantity: i64) -> Result<(), AppError> {
    if product::reserve_stock(&mut *conn, product_id, quantity).await? {
        return Ok(());
    }
    match product::find_by_id(&mut *conn, product_id).await? {
        None => Err(AppError::new(ErrorCode::ProductNotFound)),
        Some(p) if !p.is_active => Err(AppError::new(ErrorCode::ProductInactive)),
        Some(p) => Err(AppError::new(ErrorCode::ProductOutOfStock)
            .with_detail("product_id", product_id)
            .with_detail("available", p.stock)),
    }
}

/// GET /api/cart
pub async fn get_cart(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
) -> ApiResult<Cart> {
    let key = existing_key(user.as_ref(), &headers);
    let cart = match &key {
        Some(k) => cart::find(&state.pool, k).await?,
        None => None,
    };
    Ok(ApiResponse::success(cart.unwrap_or_else(|| empty_cart(key))))
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
    AppJson(payload): AppJson<AddCartItem>,
) -> Result<(HeaderMap, ApiResponse<Cart>), AppError> {
    check_quantity(payload.quantity)?;
    let (key, response_headers) = owner_for_write(&state, user.as_ref(), &headers)?;

    let mut tx = db::begin_write(&state.pool).await?;
    let item = product::find_by_id(&mut *tx, payload.product_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    if !item.is_active {
        return Err(AppError::new(ErrorCode::ProductInactive));
    }
    reserve(&mut tx, item.id, payload.quantity).await?;

    let mut cart = cart::find_or_empty(&mut *tx, &key).await?;
    cart.add_item(item.id, &item.name, item.price, payload.quantity);
    cart::save(&mut tx, &mut cart).await?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::debug!(cart_id = cart.id, product_id = item.id, quantity = payload.quantity, "Cart item added");
    Ok((
        response_headers,
        ApiResponse::success_with_message("Item added to cart", cart),
    ))
}

/// PUT /api/cart/items/{product_id}
pub async fn update_item(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
    Id(product_id): Id,
    AppJson(payload): AppJson<UpdateCartItem>,
) -> ApiResult<Cart> {
    check_quantity(payload.quantity)?;
    let key = existing_key(user.as_ref(), &headers)
        .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;

    let mut tx = db::begin_write(&state.pool).await?;
    let mut cart = cart::find(&mut *tx, &key)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;
    let previous = cart.quantity_of(product_id);
    if previous == 0 {
        return Err(AppError::new(ErrorCode::CartItemNotFound));
    }

    let delta = payload.quantity - previous;
    if delta > 0 {
        reserve(&mut tx, product_id, delta).await?;
    } else if delta < 0 {
        product::release_stock(&mut *tx, product_id, -delta).await?;
    }

    cart.set_quantity(product_id, payload.quantity);
    cart::save(&mut tx, &mut cart).await?;
    tx.commit().await.map_err(RepoError::from)?;

    Ok(ApiResponse::success_with_message("Cart updated", cart))
}

/// DELETE /api/cart/items/{product_id}
pub async fn remove_item(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
    Id(product_id): Id,
) -> ApiResult<Cart> {
    let key = existing_key(user.as_ref(), &headers)
        .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;

    let mut tx = db::begin_write(&state.pool).await?;
    let mut cart = cart::find(&mut *tx, &key)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;
    let removed = cart
        .remove_item(product_id)
        .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;
    product::release_stock(&mut *tx, product_id, removed.quantity).await?;
    cart::save(&mut tx, &mut cart).await?;
    tx.commit().await.map_err(RepoError::from)?;

    Ok(ApiResponse::success_with_message("Item removed from cart", cart))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
) -> ApiResult<Cart> {
    let key = existing_key(user.as_ref(), &headers);
    let Some(k) = &key else {
        return Ok(ApiResponse::success_with_message("Cart cleared", empty_cart(None)));
    };

    let mut tx = db::begin_write(&state.pool).await?;
    let Some(mut cart) = cart::find(&mut *tx, k).await? else {
        return Ok(ApiResponse::success_with_message("Cart cleared", empty_cart(key)));
    };
    for item in std::mem::take(&mut cart.items) {
        product::release_stock(&mut *tx, item.product_id, item.quantity).await?;
    }
    cart::save(&mut tx, &mut cart).await?;
    tx.commit().await.map_err(RepoError::from)?;

    Ok(ApiResponse::success_with_message("Cart cleared", cart))
}

/// Fold the request's guest cart into the user's cart after login
///
/// Reserved stock moves with the lines. Returns true when a guest cart
/// existed.
pub(crate) async fn merge_guest_cart(
    state: &ServerState,
    headers: &HeaderMap,
    user_id: i64,
) -> Result<bool, AppError> {
    let Some(session) = guest_session(headers) else {
        return Ok(false);
    };

    let mut tx = db::begin_write(&state.pool).await?;
    let Some(guest) = cart::find(&mut *tx, &CartKey::Session(session)).await? else {
        return Ok(false);
    };
    if !guest.is_empty() {
        let mut user_cart = cart::find_or_empty(&mut *tx, &CartKey::User(user_id)).await?;
        user_cart.merge_from(&guest);
        cart::save(&mut tx, &mut user_cart).await?;
    }
    cart::delete(&mut *tx, guest.id).await?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(user_id, guest_cart_id = guest.id, "Guest cart merged");
    Ok(true)
}
