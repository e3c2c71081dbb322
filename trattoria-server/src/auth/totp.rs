//! Time-based one-time passwords (RFC 6238) and backup codes
//!
//! HMAC-SHA1, 30 second step, 6 digits, one step of clock drift tolerated on
//! either side. Secrets are 160 bits, exchanged as unpadded RFC 4648 base32.

use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const TOTP_STEP_SECS: i64 = 30;
pub const TOTP_DIGITS: u32 = 6;
pub const TOTP_SKEW_STEPS: i64 = 1;
pub const SECRET_BYTES: usize = 20;
pub const BACKUP_CODE_COUNT: usize = 10;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const BACKUP_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TotpError {
    #[error("secure random generator failed")]
    Random,
    #[error("secret is not valid base32")]
    InvalidSecret,
}

pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decode base32, ignoring case, spaces and `=` padding
pub fn base32_decode(input: &str) -> Result<Vec<u8>, TotpError> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for c in input.chars().filter(|c| !c.is_whitespace() && *c != '=') {
        let upper = c.to_ascii_uppercase() as u8;
        let value = BASE32_ALPHABET
            .iter()
            .position(|&a| a == upper)
            .ok_or(TotpError::InvalidSecret)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((buffer >> bits) & 0xff) as u8);
        }
    }
    if out.is_empty() {
        return Err(TotpError::InvalidSecret);
    }
    Ok(out)
}

/// New random base32 secret
pub fn generate_secret() -> Result<String, TotpError> {
    let mut bytes = [0u8; SECRET_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| TotpError::Random)?;
    Ok(base32_encode(&bytes))
}

/// HOTP value for a counter (RFC 4226 dynamic truncation)
pub fn hotp(key: &[u8], counter: u64, digits: u32) -> u32 {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key);
    let tag = hmac::sign(&key, &counter.to_be_bytes());
    let digest = tag.as_ref();
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = ((digest[offset] as u32 & 0x7f) << 24)
        | ((digest[offset + 1] as u32) << 16)
        | ((digest[offset + 2] as u32) << 8)
        | digest[offset + 3] as u32;
    binary % 10u32.pow(digits)
}

/// TOTP code for a Unix time in seconds, zero padded
pub fn totp_at(key: &[u8], unix_secs: i64) -> String {
    let counter = (unix_secs.max(0) / TOTP_STEP_SECS) as u64;
    format!(
        "{:0width$}",
        hotp(key, counter, TOTP_DIGITS),
        width = TOTP_DIGITS as usize
    )
}

/// Check a code against a base32 secret, allowing ±1 step
pub fn verify_code(secret: &str, code: &str, unix_secs: i64) -> bool {
    let code = code.trim();
    if code.len() != TOTP_DIGITS as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Ok(key) = base32_decode(secret) else {
        return false;
    };
    (-TOTP_SKEW_STEPS..=TOTP_SKEW_STEPS).any(|skew| {
        let candidate = totp_at(&key, unix_secs + skew * TOTP_STEP_SECS);
        ring::constant_time::verify_slices_are_equal(candidate.as_bytes(), code.as_bytes()).is_ok()
    })
}

/// `otpauth://` provisioning URI understood by authenticator apps
pub fn otpauth_url(issuer: &str, account: &str, secret: &str) -> String {
    format!(
        "otpauth://totp/{}:{}?secret={}&issuer={}&algorithm=SHA1&digits={}&period={}",
        urlencoding::encode(issuer),
        urlencoding::encode(account),
        secret,
        urlencoding::encode(issuer),
        TOTP_DIGITS,
        TOTP_STEP_SECS
    )
}

/// Fresh backup codes in `XXXX-XXXX` form
pub fn generate_backup_codes() -> Result<Vec<String>, TotpError> {
    let rng = SystemRandom::new();
    let mut codes = Vec::with_capacity(BACKUP_CODE_COUNT);
    for _ in 0..BACKUP_CODE_COUNT {
        let mut bytes = [0u8; 8];
        rng.fill(&mut bytes).map_err(|_| TotpError::Random)?;
        let chars: String = bytes
            .iter()
            .map(|b| BACKUP_CODE_ALPHABET[(*b as usize) % BACKUP_CODE_ALPHABET.len()] as char)
            .collect();
        codes.push(format!("{}-{}", &chars[..4], &chars[4..]));
    }
    Ok(codes)
}

/// Storage digest of a backup code (case and dash insensitive)
pub fn hash_backup_code(code: &str) -> String {
    let normalized: String = code
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// Position of a matching backup code digest, if any
pub fn find_backup_code(stored: &[String], code: &str) -> Option<usize> {
    let digest = hash_backup_code(code);
    stored.iter().position(|d| {
        ring::constant_time::verify_slices_are_equal(d.as_bytes(), digest.as_bytes()).is_ok()
    })
}
