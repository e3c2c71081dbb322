//! Review Repository

use super::{RepoError, RepoResult, counter};
use shared::models::{Review, ReviewCreate, ReviewQuery};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, user_id, user_name, target_type, target_id, rating, comment, created_at";

pub async fn list(pool: &SqlitePool, query: &ReviewQuery) -> RepoResult<Vec<Review>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM reviews WHERE 1 = 1"));
    if let Some(target_type) = query.target_type {
        qb.push(" AND target_type = ").push_bind(target_type);
    }
    if let Some(target_id) = query.target_id {
        qb.push(" AND target_id = ").push_bind(target_id);
    }
    qb.push(" ORDER BY created_at DESC, id DESC");
    let reviews = qb.build_query_as::<Review>().fetch_all(pool).await?;
    Ok(reviews)
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(&format!("SELECT {COLUMNS} FROM reviews WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(review)
}

/// One review per user and target; a second one is `Duplicate`
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    user_name: &str,
    data: &ReviewCreate,
) -> RepoResult<Review> {
    let id = counter::next_id(pool, counter::REVIEWS).await?;
    sqlx::query(
        "INSERT INTO reviews (id, user_id, user_name, target_type, target_id, rating, comment, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(user_name)
    .bind(data.target_type)
    .bind(data.target_id)
    .bind(data.rating)
    .bind(&data.comment)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate("You have already reviewed this item".to_string())
        }
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create review".to_string()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
