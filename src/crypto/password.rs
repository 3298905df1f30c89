//! Password hashing — PBKDF2 via the password-hash API.
//!
//! Stored digests are self-describing PHC strings (algorithm, salt and
//! parameters included), so parameters can change without a migration.

use pbkdf2::password_hash::rand_core::OsRng;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String, pbkdf2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Pbkdf2.hash_password(plaintext.as_bytes(), &salt)?.to_string())
}

/// Verify a plaintext password against a stored digest.
///
/// An unparseable digest verifies as false rather than erroring — the
/// caller cannot distinguish it from a wrong password, by the same rule
/// that login never reveals which half of the credentials failed.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Pbkdf2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
