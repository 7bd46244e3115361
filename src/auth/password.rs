// Password hashing utilities
// Uses bcrypt for salted one-way password hashing

use bcrypt::{hash, verify};
use thiserror::Error;

/// Lowest bcrypt cost accepted by the service
pub const MIN_BCRYPT_COST: u32 = 10;

/// Default bcrypt cost
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

/// Hashes a password using bcrypt
///
/// # Arguments
/// * `password` - The plaintext password to hash
/// * `cost` - bcrypt cost factor
///
/// # Example
/// ```
/// use fotoutc_api::auth::password::hash_password;
///
/// let hash = hash_password("my_password", 10).expect("valid hash");
/// assert!(hash.starts_with("$2"));
/// ```
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    hash(password, cost).map_err(|e| PasswordError(e.to_string()))
}

/// Verifies a password against a bcrypt hash
///
/// # Returns
/// * `Ok(bool)` - True if password matches, false otherwise
/// * `Err(PasswordError)` - If the stored hash is malformed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(|e| PasswordError(e.to_string()))
}
