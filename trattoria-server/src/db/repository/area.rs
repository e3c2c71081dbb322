//! Area Repository

use super::{RepoError, RepoResult, counter};
use shared::models::{Area, AreaCreate, AreaUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, description, min_capacity, max_capacity, price_per_hour,
    image_url, is_active, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, include_inactive: bool) -> RepoResult<Vec<Area>> {
    let sql = if include_inactive {
        format!("SELECT {COLUMNS} FROM areas ORDER BY name")
    } else {
        format!("SELECT {COLUMNS} FROM areas WHERE is_active = 1 ORDER BY name")
    };
    let areas = sqlx::query_as::<_, Area>(&sql).fetch_all(pool).await?;
    Ok(areas)
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<Option<Area>> {
    let area = sqlx::query_as::<_, Area>(&format!("SELECT {COLUMNS} FROM areas WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(area)
}

pub async fn create(pool: &SqlitePool, data: AreaCreate) -> RepoResult<Area> {
    let name = data.name.trim().to_string();
    let id = counter::next_id(pool, counter::AREAS).await?;
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO areas (id, name, description, min_capacity, max_capacity, price_per_hour,
            image_url, is_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(&name)
    .bind(&data.description)
    .bind(data.min_capacity)
    .bind(data.max_capacity)
    .bind(data.price_per_hour)
    .bind(&data.image_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| duplicate_name(e, &name))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create area".to_string()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: AreaUpdate) -> RepoResult<Area> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Area {id}")))?;

    let min_capacity = data.min_capacity.unwrap_or(existing.min_capacity);
    let max_capacity = data.max_capacity.unwrap_or(existing.max_capacity);
    if min_capacity > max_capacity {
        return Err(RepoError::Validation(
            "min_capacity must not exceed max_capacity".to_string(),
        ));
    }
    let name = data.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
    let description = data.description.or(existing.description);
    let price_per_hour = data.price_per_hour.unwrap_or(existing.price_per_hour);
    let image_url = data.image_url.or(existing.image_url);
    let is_active = data.is_active.unwrap_or(existing.is_active);

    sqlx::query(
        "UPDATE areas SET name = ?, description = ?, min_capacity = ?, max_capacity = ?,
            price_per_hour = ?, image_url = ?, is_active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&name)
    .bind(&description)
    .bind(min_capacity)
    .bind(max_capacity)
    .bind(price_per_hour)
    .bind(&image_url)
    .bind(is_active)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| duplicate_name(e, &name))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Area {id}")))
}

/// Soft delete
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result =
        sqlx::query("UPDATE areas SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
            .bind(shared::util::now_millis())
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

fn duplicate_name(err: sqlx::Error, name: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Area '{name}' already exists")),
        other => other,
    }
}

#[cfg(test)]
pub(crate) fn sample(name: &str) -> AreaCreate {
    AreaCreate {
        name: name.to_string(),
        description: None,
        min_capacity: 2,
        max_capacity: 10,
        price_per_hour: 2000,
        image_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_pool;

    #[tokio::test]
    async fn update_rechecks_capacity_against_stored_values() {
        let pool = test_pool().await;
        let area = create(&pool, sample("Terrace")).await.unwrap();
        let err = update(
            &pool,
            area.id,
            AreaUpdate {
                name: None,
                description: None,
                min_capacity: Some(12),
                max_capacity: None,
                price_per_hour: None,
                image_url: None,
                is_active: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn names_are_unique_and_delete_hides() {
        let pool = test_pool().await;
        let area = create(&pool, sample("Terrace")).await.unwrap();
        assert!(matches!(
            create(&pool, sample("Terrace")).await,
            Err(RepoError::Duplicate(_))
        ));
        delete(&pool, area.id).await.unwrap();
        assert!(find_all(&pool, false).await.unwrap().is_empty());
        assert_eq!(find_all(&pool, true).await.unwrap().len(), 1);
    }
}
