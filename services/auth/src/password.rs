//! Password hashing
//!
//! Argon2 is deliberately slow, so every operation runs on the blocking
//! thread pool rather than on an async worker.

use anyhow::Result;
use argon2::{
    Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};

/// Argon2 hasher used for stored credentials
#[derive(Clone, Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Hasher with explicit cost parameters
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    /// Hash a plaintext password into a PHC string
    pub async fn hash(&self, password: String) -> Result<String> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash_now(&password)).await?
    }

    /// Check a plaintext password against a stored PHC string
    ///
    /// A mismatch is `Ok(false)`; only an unparsable stored hash is an error.
    pub async fn verify(&self, password: String, password_hash: String) -> Result<bool> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify_now(&password, &password_hash)).await?
    }

    /// Spend the work of a verification for an account that does not exist
    ///
    /// Hashing with the service's parameters costs the same as verifying a
    /// hash it produced, so unknown and known emails take equally long.
    pub async fn verify_unknown(&self, password: String) -> Result<bool> {
        self.hash(password).await?;
        Ok(false)
    }

    fn hash_now(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        Ok(hash)
    }

    fn verify_now(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
