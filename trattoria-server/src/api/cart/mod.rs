//! Cart API
//!
//! | path | method | auth |
//! |------|--------|------|
//! | /api/cart | GET, DELETE | user or guest |
//! | /api/cart/items | POST | user or guest |
//! | /api/cart/items/{product_id} | PUT, DELETE | user or guest |
//!
//! Guests are identified by the `cart_session` cookie, issued on their
//! first add.

mod handler;

pub(crate) use handler::merge_guest_cart;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/cart", get(handler::get_cart).delete(handler::clear))
        .route("/api/cart/items", post(handler::add_item))
        .route(
            "/api/cart/items/{id}",
            put(handler::update_item).delete(handler::remove_item),
        )
}
