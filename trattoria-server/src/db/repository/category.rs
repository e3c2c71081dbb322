//! Category Repository

use super::{RepoError, RepoResult, counter};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

/// Find all active categories ordered by name
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE is_active = 1 ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<Option<Category>> {
    let category =
        sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM categories WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await?;
    Ok(category)
}

/// Whether an active category with this name exists
pub async fn is_active_name<'e, E: SqliteExecutor<'e>>(db: E, name: &str) -> RepoResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE name = ? AND is_active = 1")
            .bind(name)
            .fetch_one(db)
            .await?;
    Ok(count > 0)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let name = data.name.trim().to_string();
    let id = counter::next_id(pool, counter::CATEGORIES).await?;
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO categories (id, name, description, is_active, created_at, updated_at)
         VALUES (?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(&name)
    .bind(&data.description)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| duplicate_name(e, &name))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id}")))?;

    let name = data
        .name
        .map(|n| n.trim().to_string())
        .unwrap_or(existing.name);
    let description = data.description.or(existing.description);
    let is_active = data.is_active.unwrap_or(existing.is_active);

    sqlx::query(
        "UPDATE categories SET name = ?, description = ?, is_active = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&name)
    .bind(&description)
    .bind(is_active)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| duplicate_name(e, &name))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id}")))
}

/// Soft delete
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE categories SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

fn duplicate_name(err: sqlx::Error, name: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Category '{name}' already exists")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_pool;

    fn payload(name: &str) -> CategoryCreate {
        CategoryCreate {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_list_and_soft_delete() {
        let pool = test_pool().await;
        let pizza = create(&pool, payload("Pizza")).await.unwrap();
        create(&pool, payload("Dolci")).await.unwrap();

        let names: Vec<_> = find_all(&pool).await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Dolci", "Pizza"]);
        assert!(is_active_name(&pool, "Pizza").await.unwrap());

        assert!(delete(&pool, pizza.id).await.unwrap());
        assert!(!is_active_name(&pool, "Pizza").await.unwrap());
        assert_eq!(find_all(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_name_is_reported() {
        let pool = test_pool().await;
        create(&pool, payload("Pizza")).await.unwrap();
        let err = create(&pool, payload(" Pizza ")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(msg) if msg.contains("Pizza")));
    }

    #[tokio::test]
    async fn update_missing_category() {
        let pool = test_pool().await;
        let err = update(
            &pool,
            42,
            CategoryUpdate {
                name: Some("X".into()),
                description: None,
                is_active: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
