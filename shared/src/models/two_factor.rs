//! Two-factor authentication payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Result of starting 2FA setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorSetup {
    /// Base32 secret for manual entry
    pub secret: String,
    /// `otpauth://totp/...` URI for QR rendering
    pub otpauth_url: String,
}

/// A one-time code (TOTP or backup code)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TwoFactorCode {
    #[validate(length(min = 6, max = 32, message = "code is invalid"))]
    pub code: String,
}

/// Disabling 2FA needs both factors
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TwoFactorDisable {
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(length(min = 6, max = 32, message = "code is invalid"))]
    pub code: String,
}

/// Second login step
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TwoFactorLogin {
    #[validate(length(min = 1, message = "pending_token is required"))]
    pub pending_token: String,
    #[validate(length(min = 6, max = 32, message = "code is invalid"))]
    pub code: String,
}

/// Freshly generated backup codes, shown once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupCodes {
    pub backup_codes: Vec<String>,
}
