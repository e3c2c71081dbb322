//! Password hashing (Argon2id, PHC strings)

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::OnceLock;

/// Stand-in hash for logins without a stored password
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// False for a wrong password and for an unparsable hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Check a login attempt against an account's stored hash
///
/// With no hash (unknown email or a password-less account) the same Argon2
/// verification runs against a fixed hash and the answer is false.
pub fn verify_account_password(password: &str, hash: Option<&str>) -> bool {
    match hash {
        Some(hash) => verify_password(password, hash),
        None => {
            let dummy = DUMMY_HASH.get_or_init(|| hash_password("trattoria-no-account").ok());
            if let Some(dummy) = dummy {
                verify_password(password, dummy);
            }
            false
        }
    }
}
