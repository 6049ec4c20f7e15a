//! Credential verification: bcrypt hashing and comparison.
//!
//! bcrypt is deliberately slow, so both functions hop onto the blocking
//! thread pool instead of stalling the async runtime.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash a plaintext password with a fresh salt at the given cost factor
pub async fn hash_password(plaintext: &str, cost: u32) -> Result<String, PasswordError> {
    let plaintext = plaintext.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost)).await??;
    Ok(hashed)
}

/// Compare a plaintext password against a stored bcrypt hash.
///
/// Returns `Ok(false)` on mismatch; a malformed stored hash is an error.
pub async fn verify_password(plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
    let plaintext = plaintext.to_owned();
    let hash = hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash)).await??;
    Ok(matches)
}
