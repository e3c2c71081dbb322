use crate::auth::JwtConfig;
use crate::core::ServerError;
use crate::services::cloudinary::CloudinaryConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | DATABASE_URL | trattoria.db | SQLite database path |
/// | HTTP_PORT | 3000 | HTTP port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | JWT_SECRET | (generated in development) | HS256 secret, at least 32 chars |
/// | JWT_EXPIRATION_MINUTES | 1440 | Session lifetime |
/// | CORS_ORIGINS | http://localhost:3000 | Comma separated allowed origins |
/// | CLOUDINARY_CLOUD_NAME / _API_KEY / _API_SECRET | unset | Image upload credentials |
/// | CLOUDINARY_FOLDER | trattoria | Upload folder |
/// | LOG_LEVEL | info | Default log filter |
/// | LOG_DIR | unset | Enables daily rotating file logs |
/// | LOG_JSON | false in development | JSON console output |
/// | ADMIN_EMAIL / ADMIN_PASSWORD | unset | Bootstrap admin account |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | AUTH_RATE_LIMIT | 10 | Login/register/2FA attempts per IP and minute |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_port: u16,
    pub environment: String,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
    pub cloudinary: Option<CloudinaryConfig>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub request_timeout_ms: u64,
    pub auth_rate_limit: u32,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    ///
    /// Fails when `JWT_SECRET` is unusable outside development.
    pub fn from_env() -> Result<Self, ServerError> {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";
        let jwt = JwtConfig::from_env(environment == "development")
            .map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "trattoria.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt,
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_else(|_| vec!["http://localhost:3000".into()]),
            cloudinary: CloudinaryConfig::from_env(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(is_production),
            admin_email: std::env::var("ADMIN_EMAIL").ok().filter(|v| !v.is_empty()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            auth_rate_limit: std::env::var("AUTH_RATE_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            environment,
        })
    }

    /// Configuration for tests: in-memory database, fixed secret, no uploads
    pub fn for_tests() -> Self {
        Self {
            database_url: ":memory:".into(),
            http_port: 0,
            environment: "test".into(),
            jwt: JwtConfig {
                secret: "test-secret-that-is-at-least-32-characters".into(),
                expiration_minutes: 60,
                issuer: "trattoria".into(),
                audience: "trattoria-clients".into(),
            },
            cors_origins: vec!["http://localhost:3000".into()],
            cloudinary: None,
            log_level: "warn".into(),
            log_dir: None,
            log_json: false,
            admin_email: None,
            admin_password: None,
            request_timeout_ms: 30000,
            auth_rate_limit: 1000,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed() {
        assert_eq!(
            parse_origins(" http://a.test/ ,https://b.test,,"),
            vec!["http://a.test".to_string(), "https://b.test".to_string()]
        );
    }

    #[test]
    fn test_config_is_isolated() {
        let config = Config::for_tests();
        assert_eq!(config.database_url, ":memory:");
        assert!(config.cloudinary.is_none());
        assert!(!config.is_production());
    }
}
