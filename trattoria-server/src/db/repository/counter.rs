//! Sequential id counters, one per collection

use super::RepoResult;
use sqlx::SqliteExecutor;

pub const USERS: &str = "users";
pub const CATEGORIES: &str = "categories";
pub const PRODUCTS: &str = "products";
pub const CARTS: &str = "carts";
pub const ORDERS: &str = "orders";
pub const AREAS: &str = "areas";
pub const RESERVATIONS: &str = "reservations";
pub const COUPONS: &str = "coupons";
pub const COUPON_USAGES: &str = "coupon_usages";
pub const REVIEWS: &str = "reviews";
pub const LOCATIONS: &str = "locations";
pub const OFFERS: &str = "offers";
pub const CONTACTS: &str = "contacts";

/// Atomically increment and return the next id for a collection (starts at 1)
pub async fn next_id<'e, E: SqliteExecutor<'e>>(db: E, collection: &str) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO counters (name, value) VALUES (?, 1)
         ON CONFLICT(name) DO UPDATE SET value = value + 1
         RETURNING value",
    )
    .bind(collection)
    .fetch_one(db)
    .await?;
    Ok(id)
}
