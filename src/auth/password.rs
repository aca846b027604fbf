//! Password hashing with Argon2 (PHC string format).

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use rand::RngCore;

use super::AuthError;

const SALT_LEN: usize = 16;

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(|e| AuthError::Hashing(e.to_string()))?;

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Verify a password against a stored hash.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.is_empty() {
            return Err(AuthError::Validation("password is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher;
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher;
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(PasswordHasher.verify("pw", "not-a-hash"), Err(AuthError::Hashing(_))));
        assert!(PasswordHasher::validate_password("").is_err());
    }
}
