//! User Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum UserRole {
    Admin,
    Client,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Client => "client",
        }
    }
}

/// User row
///
/// Holds credentials and 2FA secrets, so it is never serialized.
/// Handlers answer with [`UserProfile`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Lower-cased, unique
    pub email: String,
    /// Argon2 PHC string; `None` for accounts linked through Google only
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub role: UserRole,
    pub phone: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub allergies: Vec<String>,
    pub two_factor_enabled: bool,
    /// Active base32 TOTP secret
    pub two_factor_secret: Option<String>,
    /// Secret generated by setup, waiting for the first valid code
    pub two_factor_pending_secret: Option<String>,
    /// SHA-256 hex digests of unused backup codes
    #[cfg_attr(feature = "db", sqlx(json))]
    pub backup_codes: Vec<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub allergies: Vec<String>,
    pub two_factor_enabled: bool,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            allergies: user.allergies.clone(),
            two_factor_enabled: user.two_factor_enabled,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Login result
///
/// When the account has 2FA enabled, `user` is absent and the client must
/// call the verify-login endpoint with `pending_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub requires_two_factor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    /// Session token, also set as the `token` cookie
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl LoginResponse {
    /// Completed login
    pub fn session(user: UserProfile, token: String) -> Self {
        Self {
            requires_two_factor: false,
            pending_token: None,
            user: Some(user),
            token: Some(token),
        }
    }

    /// Password accepted, second factor outstanding
    pub fn pending(pending_token: String) -> Self {
        Self {
            requires_two_factor: true,
            pending_token: Some(pending_token),
            user: None,
            token: None,
        }
    }
}

/// Self-service profile update
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub allergies: Option<Vec<String>>,
}

/// Password change payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordChange {
    #[validate(length(min = 1, message = "current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub new_password: String,
}

/// Admin role change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: UserRole,
}
