use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Output of [`hash_password`]. The only way to build one is to hash a
/// plaintext, so a stored digest can never be fed back through the hasher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Argon2id with the crate's default (fixed) cost parameters and a fresh salt per call.
pub fn hash_password(plain: &str) -> anyhow::Result<PasswordDigest> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(PasswordDigest(hash))
}

/// Fails closed: a malformed stored digest is a non-match.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "argon2 parse hash error");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

pub async fn hash_password_blocking(plain: String) -> anyhow::Result<PasswordDigest> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

pub async fn verify_password_blocking(plain: String, digest: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&plain, &digest))
        .await
        .unwrap_or(false)
}
