//! Offer Repository
//!
//! `original_price` is resolved by the caller from current product prices.

use super::{RepoError, RepoResult, counter};
use shared::models::{Offer, OfferCreate};
use sqlx::types::Json;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, title, description, items, original_price, offer_price, valid_from,
    valid_until, image_url, is_active, created_at, updated_at";

/// Active offers whose validity window contains `now`
pub async fn find_live(pool: &SqlitePool, now: i64) -> RepoResult<Vec<Offer>> {
    let offers = sqlx::query_as::<_, Offer>(&format!(
        "SELECT {COLUMNS} FROM offers
         WHERE is_active = 1 AND valid_from <= ? AND valid_until >= ?
         ORDER BY valid_until"
    ))
    .bind(now)
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(offers)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Offer>> {
    let offers =
        sqlx::query_as::<_, Offer>(&format!("SELECT {COLUMNS} FROM offers ORDER BY id DESC"))
            .fetch_all(pool)
            .await?;
    Ok(offers)
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<Option<Offer>> {
    let offer = sqlx::query_as::<_, Offer>(&format!("SELECT {COLUMNS} FROM offers WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(offer)
}

pub async fn create(pool: &SqlitePool, data: &OfferCreate, original_price: i64) -> RepoResult<Offer> {
    let id = counter::next_id(pool, counter::OFFERS).await?;
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO offers (id, title, description, items, original_price, offer_price,
            valid_from, valid_until, image_url, is_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(data.title.trim())
    .bind(&data.description)
    .bind(Json(&data.items))
    .bind(original_price)
    .bind(data.offer_price)
    .bind(data.valid_from)
    .bind(data.valid_until)
    .bind(&data.image_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create offer".to_string()))
}

/// Persist every mutable field of an already merged offer
pub async fn save(pool: &SqlitePool, offer: &Offer) -> RepoResult<Offer> {
    let result = sqlx::query(
        "UPDATE offers SET title = ?, description = ?, items = ?, original_price = ?,
            offer_price = ?, valid_from = ?, valid_until = ?, image_url = ?, is_active = ?,
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&offer.title)
    .bind(&offer.description)
    .bind(Json(&offer.items))
    .bind(offer.original_price)
    .bind(offer.offer_price)
    .bind(offer.valid_from)
    .bind(offer.valid_until)
    .bind(&offer.image_url)
    .bind(offer.is_active)
    .bind(shared::util::now_millis())
    .bind(offer.id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Offer {}", offer.id)));
    }

    find_by_id(pool, offer.id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Offer {}", offer.id)))
}

/// Soft delete
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result =
        sqlx::query("UPDATE offers SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
            .bind(shared::util::now_millis())
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
