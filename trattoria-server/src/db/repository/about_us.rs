//! About Us singleton (row id 1)

use super::RepoResult;
use shared::models::{AboutUs, AboutUsUpdate};
use sqlx::SqlitePool;

/// Stored content, or the empty default before the first edit
pub async fn get(pool: &SqlitePool) -> RepoResult<AboutUs> {
    let about = sqlx::query_as::<_, AboutUs>(
        "SELECT title, content, mission, vision, image_url, updated_at FROM about_us WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(about.unwrap_or_default())
}

pub async fn upsert(pool: &SqlitePool, data: AboutUsUpdate) -> RepoResult<AboutUs> {
    sqlx::query(
        "INSERT INTO about_us (id, title, content, mission, vision, image_url, updated_at)
         VALUES (1, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title, content = excluded.content, mission = excluded.mission,
            vision = excluded.vision, image_url = excluded.image_url,
            updated_at = excluded.updated_at",
    )
    .bind(&data.title)
    .bind(&data.content)
    .bind(&data.mission)
    .bind(&data.vision)
    .bind(&data.image_url)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    get(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_pool;

    #[tokio::test]
    async fn default_then_upsert_twice() {
        let pool = test_pool().await;
        assert_eq!(get(&pool).await.unwrap().title, "");

        for title in ["Our story", "Our family story"] {
            upsert(
                &pool,
                AboutUsUpdate {
                    title: title.into(),
                    content: "Since 1962".into(),
                    mission: None,
                    vision: None,
                    image_url: None,
                },
            )
            .await
            .unwrap();
        }

        let about = get(&pool).await.unwrap();
        assert_eq!(about.title, "Our family story");
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM about_us")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}
