//! Location Repository

use super::{RepoError, RepoResult, counter};
use shared::models::{Location, LocationCreate, LocationUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, address, city, phone, email, opening_hours, latitude, longitude,
    is_active, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Location>> {
    let locations = sqlx::query_as::<_, Location>(&format!(
        "SELECT {COLUMNS} FROM locations WHERE is_active = 1 ORDER BY city, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(locations)
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
) -> RepoResult<Option<Location>> {
    let location =
        sqlx::query_as::<_, Location>(&format!("SELECT {COLUMNS} FROM locations WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await?;
    Ok(location)
}

pub async fn create(pool: &SqlitePool, data: LocationCreate) -> RepoResult<Location> {
    let id = counter::next_id(pool, counter::LOCATIONS).await?;
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO locations (id, name, address, city, phone, email, opening_hours, latitude,
            longitude, is_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.address.trim())
    .bind(data.city.trim())
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.opening_hours)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create location".to_string()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: LocationUpdate) -> RepoResult<Location> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Location {id}")))?;

    sqlx::query(
        "UPDATE locations SET name = ?, address = ?, city = ?, phone = ?, email = ?,
            opening_hours = ?, latitude = ?, longitude = ?, is_active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(data.name.unwrap_or(existing.name))
    .bind(data.address.unwrap_or(existing.address))
    .bind(data.city.unwrap_or(existing.city))
    .bind(data.phone.or(existing.phone))
    .bind(data.email.or(existing.email))
    .bind(data.opening_hours.or(existing.opening_hours))
    .bind(data.latitude.or(existing.latitude))
    .bind(data.longitude.or(existing.longitude))
    .bind(data.is_active.unwrap_or(existing.is_active))
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Location {id}")))
}

/// Soft delete
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE locations SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_pool;

    #[tokio::test]
    async fn crud_cycle() {
        let pool = test_pool().await;
        let created = create(
            &pool,
            LocationCreate {
                name: "Centro".into(),
                address: "Via Roma 1".into(),
                city: "Bologna".into(),
                phone: None,
                email: Some("centro@example.com".into()),
                opening_hours: Some("12-23".into()),
                latitude: Some(44.49),
                longitude: Some(11.34),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.latitude, Some(44.49));

        let updated = update(
            &pool,
            created.id,
            LocationUpdate {
                name: None,
                address: None,
                city: Some("Modena".into()),
                phone: Some("051".into()),
                email: None,
                opening_hours: None,
                latitude: None,
                longitude: None,
                is_active: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.city, "Modena");
        assert_eq!(updated.email.as_deref(), Some("centro@example.com"));

        assert!(delete(&pool, created.id).await.unwrap());
        assert!(find_all(&pool).await.unwrap().is_empty());
    }
}
