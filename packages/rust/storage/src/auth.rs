//! Password hashing and the signup/login gate.
//!
//! Passwords are hashed with Argon2id and stored as PHC strings in the flat
//! user table. Authentication is a pass/fail check consumed by the CLI
//! before a comparison run starts.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::info;

use policydiff_shared::{PolicyDiffError, Result};

use crate::Storage;

/// Hash a password into a PHC-format Argon2id string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PolicyDiffError::Auth(format!("failed to hash password: {e}")))
}

/// Verify a password against a stored PHC hash.
///
/// Unparseable hashes verify as `false` rather than erroring — a corrupt
/// row must not open the gate.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Create a new account. Returns `false` when the username is taken.
pub async fn signup(storage: &Storage, username: &str, password: &str) -> Result<bool> {
    if storage.user_exists(username).await? {
        return Ok(false);
    }

    let hash = hash_password(password)?;
    storage.insert_user(username, &hash).await?;
    info!(username, "account created");
    Ok(true)
}

/// The pass/fail gate: `true` only when the user exists and the password
/// verifies against the stored hash.
pub async fn authenticate(storage: &Storage, username: &str, password: &str) -> Result<bool> {
    match storage.password_hash(username).await? {
        Some(hash) => Ok(verify_password(password, &hash)),
        None => Ok(false),
    }
}
