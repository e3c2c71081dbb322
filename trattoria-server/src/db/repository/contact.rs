//! Contact Repository

use super::{RepoError, RepoResult, counter};
use shared::models::{Contact, ContactCreate, ContactStatus};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, email, phone, subject, message, status, created_at";

pub async fn list(pool: &SqlitePool, status: Option<ContactStatus>) -> RepoResult<Vec<Contact>> {
    let contacts = match status {
        Some(status) => {
            sqlx::query_as::<_, Contact>(&format!(
                "SELECT {COLUMNS} FROM contacts WHERE status = ? ORDER BY id DESC"
            ))
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Contact>(&format!("SELECT {COLUMNS} FROM contacts ORDER BY id DESC"))
                .fetch_all(pool)
                .await?
        }
    };
    Ok(contacts)
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<Option<Contact>> {
    let contact =
        sqlx::query_as::<_, Contact>(&format!("SELECT {COLUMNS} FROM contacts WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await?;
    Ok(contact)
}

pub async fn create(pool: &SqlitePool, data: ContactCreate) -> RepoResult<Contact> {
    let id = counter::next_id(pool, counter::CONTACTS).await?;
    sqlx::query(
        "INSERT INTO contacts (id, name, email, phone, subject, message, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?, 'new', ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(shared::util::normalize_email(&data.email))
    .bind(&data.phone)
    .bind(&data.subject)
    .bind(&data.message)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to store message".to_string()))
}

pub async fn update_status(pool: &SqlitePool, id: i64, status: ContactStatus) -> RepoResult<Contact> {
    let result = sqlx::query("UPDATE contacts SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Contact message {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Contact message {id}")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
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
    async fn inbox_flow() {
        let pool = test_pool().await;
        let msg = create(
            &pool,
            ContactCreate {
                name: "Bruno".into(),
                email: "Bruno@Example.com".into(),
                phone: None,
                subject: Some("Party".into()),
                message: "Table for 20?".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(msg.status, ContactStatus::New);
        assert_eq!(msg.email, "bruno@example.com");

        update_status(&pool, msg.id, ContactStatus::Replied).await.unwrap();
        assert!(list(&pool, Some(ContactStatus::New)).await.unwrap().is_empty());
        assert_eq!(list(&pool, None).await.unwrap().len(), 1);

        assert!(delete(&pool, msg.id).await.unwrap());
        assert!(matches!(
            update_status(&pool, msg.id, ContactStatus::Read).await,
            Err(RepoError::NotFound(_))
        ));
    }
}
