use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::password::hash_password;
use crate::auth::{JwtService, RateLimiter};
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::repository::user::{self, NewUser};
use crate::services::CloudinaryClient;
use shared::models::UserRole;

/// Rate limiter sweep interval
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Shared server state, cheap to clone
///
/// | field | description |
/// |-------|-------------|
/// | config | immutable configuration |
/// | pool | SQLite connection pool |
/// | jwt_service | token issuing and validation |
/// | rate_limiter | per-IP limits for credential routes |
/// | cloudinary | upload client, `None` when not configured |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub rate_limiter: RateLimiter,
    pub cloudinary: Option<CloudinaryClient>,
}

impl ServerState {
    /// Open the database, build services and bootstrap the admin account
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_url)
            .await
            .map_err(|e| ServerError::Database(e.message))?;

        let cloudinary = match config.cloudinary.clone() {
            Some(cfg) => Some(
                CloudinaryClient::new(cfg).map_err(|e| ServerError::Config(e.to_string()))?,
            ),
            None => {
                tracing::warn!("Cloudinary credentials not set, image upload disabled");
                None
            }
        };

        let state = Self {
            config: Arc::new(config.clone()),
            pool: db.pool,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            rate_limiter: RateLimiter::new(config.auth_rate_limit),
            cloudinary,
        };

        state.bootstrap_admin().await?;
        Ok(state)
    }

    /// Create the configured admin when no active admin exists yet
    async fn bootstrap_admin(&self) -> Result<()> {
        let (Some(email), Some(password)) =
            (&self.config.admin_email, &self.config.admin_password)
        else {
            return Ok(());
        };

        let db_err = |e: crate::db::repository::RepoError| ServerError::Database(e.to_string());
        if user::admin_exists(&self.pool).await.map_err(db_err)? {
            return Ok(());
        }

        if let Some(existing) = user::find_by_email(&self.pool, email).await.map_err(db_err)? {
            user::update_role(&self.pool, existing.id, UserRole::Admin)
                .await
                .map_err(db_err)?;
            tracing::info!(email = %existing.email, "Promoted existing user to admin");
            return Ok(());
        }

        let hash = hash_password(password)
            .map_err(|e| ServerError::Config(format!("Cannot hash admin password: {e}")))?;
        let admin = user::create(
            &self.pool,
            NewUser {
                name: "Administrator",
                email,
                password_hash: Some(&hash),
                role: UserRole::Admin,
                phone: None,
                allergies: &[],
            },
        )
        .await
        .map_err(db_err)?;
        tracing::info!(email = %admin.email, "Bootstrap admin account created");
        Ok(())
    }

    /// Spawn periodic maintenance tasks
    pub fn start_background_tasks(&self) {
        let limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                limiter.cleanup().await;
                tracing::debug!("Rate limiter entries swept");
            }
        });
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Cookies carry `Secure` in production
    pub fn secure_cookies(&self) -> bool {
        self.config.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_creates_admin_once() {
        let mut config = Config::for_tests();
        config.admin_email = Some("Boss@Trattoria.test".into());
        config.admin_password = Some("super-secret-pw".into());

        let state = ServerState::initialize(&config).await.unwrap();
        let admin = user::find_by_email(&state.pool, "boss@trattoria.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);

        state.bootstrap_admin().await.unwrap();
        let (_, total) = user::list(&state.pool, &shared::PageRequest::from_query(None, None))
            .await
            .unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn no_bootstrap_without_credentials() {
        let state = ServerState::initialize(&Config::for_tests()).await.unwrap();
        assert!(!user::admin_exists(&state.pool).await.unwrap());
        assert!(state.cloudinary.is_none());
        assert!(!state.secure_cookies());
    }
}
