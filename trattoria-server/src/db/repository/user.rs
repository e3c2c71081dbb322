//! User Repository

use super::{RepoError, RepoResult, counter};
use shared::PageRequest;
use shared::models::{ProfileUpdate, User, UserRole};
use sqlx::types::Json;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, email, password_hash, google_id, role, phone, allergies,
    two_factor_enabled, two_factor_secret, two_factor_pending_secret, backup_codes,
    is_active, created_at, updated_at";

/// Fields of a user row supplied at creation
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub role: UserRole,
    pub phone: Option<&'a str>,
    pub allergies: &'a [String],
}

pub async fn create(pool: &SqlitePool, new: NewUser<'_>) -> RepoResult<User> {
    let id = counter::next_id(pool, counter::USERS).await?;
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, phone, allergies, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(new.name)
    .bind(shared::util::normalize_email(new.email))
    .bind(new.password_hash)
    .bind(new.role)
    .bind(new.phone)
    .bind(Json(new.allergies))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Email '{}' is already registered", new.email))
        }
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn find_by_email<'e, E: SqliteExecutor<'e>>(
    db: E,
    email: &str,
) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
        .bind(shared::util::normalize_email(email))
        .fetch_optional(db)
        .await?;
    Ok(user)
}

/// Page of users (newest first) plus the total count
pub async fn list(pool: &SqlitePool, page: &PageRequest) -> RepoResult<(Vec<User>, u64)> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users ORDER BY id DESC LIMIT ? OFFSET ?"
    ))
    .bind(page.limit as i64)
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok((users, total as u64))
}

pub async fn admin_exists<'e, E: SqliteExecutor<'e>>(db: E) -> RepoResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin' AND is_active = 1")
            .fetch_one(db)
            .await?;
    Ok(count > 0)
}

pub async fn update_profile(pool: &SqlitePool, id: i64, data: &ProfileUpdate) -> RepoResult<User> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id}")))?;

    let name = data.name.as_deref().unwrap_or(&existing.name);
    let phone = data.phone.as_deref().or(existing.phone.as_deref());
    let allergies = data.allergies.as_ref().unwrap_or(&existing.allergies);

    sqlx::query("UPDATE users SET name = ?, phone = ?, allergies = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(phone)
        .bind(Json(allergies))
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id}")))
}

pub async fn update_password<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    password_hash: &str,
) -> RepoResult<()> {
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_role(pool: &SqlitePool, id: i64, role: UserRole) -> RepoResult<User> {
    let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id}")))
}

/// Soft delete
pub async fn deactivate<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE users SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Store (or clear) the secret awaiting confirmation
pub async fn set_pending_secret<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    secret: Option<&str>,
) -> RepoResult<()> {
    sqlx::query("UPDATE users SET two_factor_pending_secret = ?, updated_at = ? WHERE id = ?")
        .bind(secret)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Promote a confirmed secret and store hashed backup codes
pub async fn enable_two_factor<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    secret: &str,
    backup_code_hashes: &[String],
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE users SET two_factor_enabled = 1, two_factor_secret = ?,
            two_factor_pending_secret = NULL, backup_codes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(secret)
    .bind(Json(backup_code_hashes))
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn disable_two_factor<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE users SET two_factor_enabled = 0, two_factor_secret = NULL,
            two_factor_pending_secret = NULL, backup_codes = '[]', updated_at = ?
         WHERE id = ?",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn set_backup_codes<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    backup_code_hashes: &[String],
) -> RepoResult<()> {
    sqlx::query("UPDATE users SET backup_codes = ?, updated_at = ? WHERE id = ?")
        .bind(Json(backup_code_hashes))
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Replace the backup code list only if it still equals `expected`
///
/// Returns false when another request changed the list first.
pub async fn consume_backup_code<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    expected: &[String],
    remaining: &[String],
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE users SET backup_codes = ?, updated_at = ? WHERE id = ? AND backup_codes = ?",
    )
    .bind(Json(remaining))
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(Json(expected))
    .execute(db)
    .await?;
    Ok(result.rows_affected() == 1)
}
