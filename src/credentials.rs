use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// One-way hashing of credentials stored alongside a lead.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, secret: &str) -> String;
}

/// Salted SHA-256, stored as `sha256$<salt>$<hex digest>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl CredentialHasher for Sha256Hasher {
    fn hash(&self, secret: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();

        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(secret.as_bytes());

        format!("sha256${}${}", salt, hex::encode(hasher.finalize()))
    }
}

/// Random secret nobody knows, used for leads that are not accounts yet.
///
/// The account has to go through a password reset before anyone can log in.
pub fn unusable_secret() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Utc::now().timestamp_millis()
    )
}
