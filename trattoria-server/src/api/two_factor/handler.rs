//! Two-factor API Handlers

use axum::extract::State;

use crate::api::{ApiResult, ValidatedJson};
use crate::auth::CurrentUser;
use crate::auth::password::verify_password;
use crate::auth::totp::{self, TotpError};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use shared::models::{BackupCodes, TwoFactorCode, TwoFactorDisable, TwoFactorSetup, User};
use shared::{ApiResponse, AppError, ErrorCode};

/// Issuer shown by authenticator apps
const TOTP_ISSUER: &str = "Trattoria";

fn totp_failure(e: TotpError) -> AppError {
    tracing::error!(error = %e, "TOTP secret generation failed");
    AppError::internal("Failed to generate two-factor secret")
}

async fn load_user(state: &ServerState, id: i64) -> Result<User, AppError> {
    user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

/// Accept a current TOTP code or consume one backup code
pub(crate) async fn verify_second_factor(
    state: &ServerState,
    account: &User,
    code: &str,
) -> Result<(), AppError> {
    let now_secs = shared::util::now_millis() / 1000;
    if let Some(secret) = &account.two_factor_secret
        && totp::verify_code(secret, code, now_secs)
    {
        return Ok(());
    }

    if let Some(index) = totp::find_backup_code(&account.backup_codes, code) {
        let mut remaining = account.backup_codes.clone();
        remaining.remove(index);
        if !user::consume_backup_code(&state.pool, account.id, &account.backup_codes, &remaining)
            .await?
        {
            security_log!("WARN", "backup_code_replayed", user_id = account.id);
            return Err(AppError::new(ErrorCode::TwoFactorInvalidCode));
        }
        security_log!(
            "INFO",
            "backup_code_used",
            user_id = account.id,
            remaining = remaining.len()
        );
        return Ok(());
    }

    security_log!("WARN", "2fa_code_rejected", user_id = account.id);
    Err(AppError::new(ErrorCode::TwoFactorInvalidCode))
}

/// Fresh backup codes: clear text for the client, digests for storage
fn new_backup_codes() -> Result<(Vec<String>, Vec<String>), AppError> {
    let codes = totp::generate_backup_codes().map_err(totp_failure)?;
    let hashes = codes.iter().map(|c| totp::hash_backup_code(c)).collect();
    Ok((codes, hashes))
}

/// POST /api/auth/2fa/setup
pub async fn setup(State(state): State<ServerState>, current: CurrentUser) -> ApiResult<TwoFactorSetup> {
    let account = load_user(&state, current.id).await?;
    if account.two_factor_enabled {
        return Err(AppError::new(ErrorCode::TwoFactorAlreadyEnabled));
    }

    let secret = totp::generate_secret().map_err(totp_failure)?;
    user::set_pending_secret(&state.pool, account.id, Some(&secret)).await?;

    Ok(ApiResponse::success_with_message(
        "Scan the code with your authenticator app",
        TwoFactorSetup {
            otpauth_url: totp::otpauth_url(TOTP_ISSUER, &account.email, &secret),
            secret,
        },
    ))
}

/// POST /api/auth/2fa/enable
pub async fn enable(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<TwoFactorCode>,
) -> ApiResult<BackupCodes> {
    let account = load_user(&state, current.id).await?;
    if account.two_factor_enabled {
        return Err(AppError::new(ErrorCode::TwoFactorAlreadyEnabled));
    }
    let pending = account
        .two_factor_pending_secret
        .as_deref()
        .ok_or_else(|| AppError::new(ErrorCode::TwoFactorSetupMissing))?;

    if !totp::verify_code(pending, &payload.code, shared::util::now_millis() / 1000) {
        security_log!("WARN", "2fa_enable_rejected", user_id = account.id);
        return Err(AppError::new(ErrorCode::TwoFactorInvalidCode));
    }

    let (codes, hashes) = new_backup_codes()?;
    user::enable_two_factor(&state.pool, account.id, pending, &hashes).await?;
    security_log!("INFO", "2fa_enabled", user_id = account.id);

    Ok(ApiResponse::success_with_message(
        "Two-factor authentication enabled",
        BackupCodes {
            backup_codes: codes,
        },
    ))
}

/// POST /api/auth/2fa/disable
pub async fn disable(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<TwoFactorDisable>,
) -> ApiResult<()> {
    let account = load_user(&state, current.id).await?;
    if !account.two_factor_enabled {
        return Err(AppError::new(ErrorCode::TwoFactorNotEnabled));
    }
    let password_ok = account
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&payload.password, hash));
    if !password_ok {
        security_log!("WARN", "2fa_disable_bad_password", user_id = account.id);
        return Err(AppError::invalid_credentials());
    }

    verify_second_factor(&state, &account, &payload.code).await?;
    user::disable_two_factor(&state.pool, account.id).await?;
    security_log!("INFO", "2fa_disabled", user_id = account.id);

    Ok(ApiResponse::ok("Two-factor authentication disabled"))
}

/// POST /api/auth/2fa/backup-codes
pub async fn regenerate_backup_codes(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<TwoFactorCode>,
) -> ApiResult<BackupCodes> {
    let account = load_user(&state, current.id).await?;
    if !account.two_factor_enabled {
        return Err(AppError::new(ErrorCode::TwoFactorNotEnabled));
    }
    verify_second_factor(&state, &account, &payload.code).await?;

    let (codes, hashes) = new_backup_codes()?;
    user::set_backup_codes(&state.pool, account.id, &hashes).await?;
    security_log!("INFO", "backup_codes_regenerated", user_id = account.id);

    Ok(ApiResponse::success_with_message(
        "New backup codes generated",
        BackupCodes {
            backup_codes: codes,
        },
    ))
}
