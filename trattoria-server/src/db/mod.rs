//! Database Module
//!
//! Handles the SQLite connection pool and migrations

pub mod repository;

use repository::RepoError;
use shared::AppError;
use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

/// Database service, owns the SQLite connection pool
#[derive(Clone, Debug)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database with WAL and foreign keys, then migrate.
    ///
    /// `":memory:"` opens a private in-memory database on a single connection.
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let in_memory = db_path == ":memory:";
        let url = if in_memory {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{db_path}")
        };

        let mut options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .optimize_on_close(true, None);
        }

        let pool_options = if in_memory {
            // every connection to :memory: is a separate database
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(path = %db_path, "Database connection established");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }
}

/// Transaction that holds the write lock from its first statement
///
/// Read-then-write transactions must start here. A deferred transaction that
/// reads first cannot upgrade to a writer once another connection has
/// committed, and SQLite reports that as SQLITE_BUSY without waiting on the
/// busy timeout.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, RepoError> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(RepoError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_file_database_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trattoria.db");
        let db = DbService::new(path.to_str().unwrap()).await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'products', 'reservations')",
        )
        .fetch_one(&db.pool)
        .await
        .unwrap();
        assert_eq!(tables, 3);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn in_memory_database_is_usable() {
        let db = DbService::new(":memory:").await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn write_transactions_queue_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trattoria.db");
        let db = DbService::new(path.to_str().unwrap()).await.unwrap();
        sqlx::query("INSERT INTO counters (name, value) VALUES ('race', 0)")
            .execute(&db.pool)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let pool = db.pool.clone();
            handles.push(tokio::spawn(async move {
                let mut tx = begin_write(&pool).await.unwrap();
                let value: i64 =
                    sqlx::query_scalar("SELECT value FROM counters WHERE name = 'race'")
                        .fetch_one(&mut *tx)
                        .await
                        .unwrap();
                tokio::task::yield_now().await;
                sqlx::query("UPDATE counters SET value = ? WHERE name = 'race'")
                    .bind(value + 1)
                    .execute(&mut *tx)
                    .await
                    .unwrap();
                tx.commit().await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let value: i64 = sqlx::query_scalar("SELECT value FROM counters WHERE name = 'race'")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(value, 20);
    }
}
