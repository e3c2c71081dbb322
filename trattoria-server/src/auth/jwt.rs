//! JWT token service
//!
//! Issues and validates HS256 session tokens and the short-lived tokens that
//! carry a login across the second-factor step.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::models::{User, UserRole};
use thiserror::Error;

/// Token type for regular sessions
pub const TOKEN_TYPE_ACCESS: &str = "access";
/// Token type for a password-verified login waiting for its second factor
pub const TOKEN_TYPE_2FA_PENDING: &str = "2fa_pending";
/// Lifetime of a pending 2FA token
pub const PENDING_TOKEN_MINUTES: i64 = 5;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Session lifetime in minutes
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// Read `JWT_*` variables
    ///
    /// A missing or short `JWT_SECRET` is an error unless `allow_generated`
    /// is set, in which case a random secret is used for this process only.
    pub fn from_env(allow_generated: bool) -> Result<Self, JwtError> {
        let secret = match load_jwt_secret() {
            Ok(secret) => secret,
            Err(e) if allow_generated => {
                tracing::warn!("JWT configuration error: {}, using generated key", e);
                generate_printable_secret()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "trattoria".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "trattoria-clients".to_string()),
        })
    }
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Wrong token type: expected {expected}")]
    WrongTokenType { expected: &'static str },

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Generate a printable random secret (development fallback)
pub fn generate_printable_secret() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    if rng.fill(&mut bytes).is_err() {
        return "trattoria-development-fallback-secret-change-me".to_string();
    }
    bytes
        .iter()
        .map(|b| CHARSET[(*b as usize) % CHARSET.len()] as char)
        .collect()
}

fn load_jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if secret.len() >= 32 => Ok(secret),
        Ok(_) => Err(JwtError::ConfigError(
            "JWT_SECRET must be at least 32 characters long".to_string(),
        )),
        Err(_) => Err(JwtError::ConfigError(
            "JWT_SECRET environment variable is not set".to_string(),
        )),
    }
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("expiration_minutes", &self.config.expiration_minutes)
            .finish()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Session token for a user
    pub fn generate_token(&self, user: &User) -> Result<String, JwtError> {
        self.sign(
            user.id,
            &user.email,
            user.role,
            TOKEN_TYPE_ACCESS,
            Duration::minutes(self.config.expiration_minutes),
        )
    }

    /// Five-minute token proving the password step of a 2FA login
    pub fn generate_pending_token(&self, user: &User) -> Result<String, JwtError> {
        self.sign(
            user.id,
            &user.email,
            user.role,
            TOKEN_TYPE_2FA_PENDING,
            Duration::minutes(PENDING_TOKEN_MINUTES),
        )
    }

    fn sign(
        &self,
        user_id: i64,
        email: &str,
        role: UserRole,
        token_type: &str,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.as_str().to_string(),
            token_type: token_type.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate signature, expiry, issuer and audience
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validate a session token (rejects pending 2FA tokens)
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(JwtError::WrongTokenType {
                expected: TOKEN_TYPE_ACCESS,
            });
        }
        Ok(claims)
    }

    /// Validate a pending 2FA token
    pub fn validate_pending_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TOKEN_TYPE_2FA_PENDING {
            return Err(JwtError::WrongTokenType {
                expected: TOKEN_TYPE_2FA_PENDING,
            });
        }
        Ok(claims)
    }

    /// Extract the token from an Authorization header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    /// Session lifetime in seconds (cookie Max-Age)
    pub fn session_max_age(&self) -> i64 {
        self.config.expiration_minutes * 60
    }
}
