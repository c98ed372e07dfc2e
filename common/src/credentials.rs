//! Salted credential storage: seeding the admin record and checking logins.

use std::sync::Arc;

use crate::error::AuthError;
use crate::kdf::{hashes_match, Kdf};
use crate::models::UserRecord;
use crate::store::UserRepository;

/// Owns the user collection handle and the KDF used for every record in it
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
    kdf: Kdf,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>, kdf: Kdf) -> Self {
        Self { users, kdf }
    }

    /// Replace the user collection with a single freshly salted record.
    ///
    /// The hash is computed before anything is written, and the write is one
    /// `replace_all`, so a failed or cancelled seed never leaves a partial record.
    pub async fn seed(&self, username: &str, password: &str) -> Result<UserRecord, AuthError> {
        let salt = self.kdf.generate_salt();
        let password_hash = self
            .kdf
            .derive_blocking(password.to_string(), salt.clone())
            .await?;

        let record = UserRecord {
            username: username.to_string(),
            password_hash,
            salt,
        };

        self.users
            .replace_all(vec![record.clone()])
            .await
            .map_err(AuthError::StoreUnavailable)?;

        tracing::info!("Seeded credential store with user: {}", username);
        Ok(record)
    }

    /// Check a password, keeping the reason for a failure.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let record = self
            .users
            .find_one(username)
            .await
            .map_err(AuthError::StoreUnavailable)?;

        let Some(record) = record else {
            // Spend one derivation anyway so unknown users cost the same as a bad password.
            let salt = self.kdf.generate_salt();
            self.kdf.derive_blocking(password.to_string(), salt).await?;
            return Err(AuthError::NotFound {
                username: username.to_string(),
            });
        };

        let candidate = self
            .kdf
            .derive_blocking(password.to_string(), record.salt.clone())
            .await?;

        if hashes_match(&candidate, &record.password_hash) {
            Ok(())
        } else {
            Err(AuthError::HashMismatch {
                username: username.to_string(),
            })
        }
    }

    /// Check a password. Every failure mode collapses to `false`; the detail
    /// only goes to the logs.
    pub async fn verify(&self, username: &str, password: &str) -> bool {
        match self.authenticate(username, password).await {
            Ok(()) => {
                tracing::info!("Credentials verified for user: {}", username);
                true
            }
            Err(e @ (AuthError::NotFound { .. } | AuthError::HashMismatch { .. })) => {
                tracing::warn!("Login rejected: {}", e);
                false
            }
            Err(e) => {
                tracing::error!("Login check failed: {}", e);
                false
            }
        }
    }
}
