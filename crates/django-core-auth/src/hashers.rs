//! Argon2id password hashing.
//!
//! Hashes are stored in PHC string format (`$argon2id$v=19$...`). A hash that
//! starts with [`UNUSABLE_PASSWORD_PREFIX`] never verifies.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use django_core_common::error::{CoreError, CoreResult};

/// Prefix marking a password that can never be used to log in.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

fn join_error(e: &tokio::task::JoinError) -> CoreError {
    CoreError::InternalServerError(format!("Task join error: {e}"))
}

/// Hashes `password` with Argon2id and a fresh random salt.
pub async fn make_password(password: &str) -> CoreResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CoreError::InternalServerError(format!("Argon2 hash error: {e}")))
    })
    .await
    .map_err(|e| join_error(&e))?
}

/// Checks `password` against an encoded hash.
///
/// Unusable hashes return `Ok(false)`; a hash in any other format is an error.
pub async fn check_password(password: &str, hash: &str) -> CoreResult<bool> {
    if !is_password_usable(hash) {
        return Ok(false);
    }
    if !hash.starts_with("$argon2") {
        return Err(CoreError::InternalServerError(format!(
            "Unknown password hashing algorithm for hash: {}",
            hash.chars().take(20).collect::<String>()
        )));
    }

    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| CoreError::InternalServerError(format!("Invalid hash: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| join_error(&e))?
}

/// `false` for empty hashes and hashes marked unusable.
pub fn is_password_usable(hash: &str) -> bool {
    !hash.is_empty() && !hash.starts_with(UNUSABLE_PASSWORD_PREFIX)
}
