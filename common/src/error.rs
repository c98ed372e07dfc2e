//! Internal error types. These carry full detail for the logs; the web layer
//! only ever sees `bool` from credential checks and `Access` from the gate.

use thiserror::Error;

/// Persistence layer errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Store document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable {
            message: e.to_string(),
        }
    }
}

/// Key derivation errors.
#[derive(Error, Debug)]
pub enum KdfError {
    #[error("Key derivation task failed: {message}")]
    Task { message: String },
}

/// Credential check failures.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("No such user: {username}")]
    NotFound { username: String },

    #[error("Password mismatch for user: {username}")]
    HashMismatch { username: String },

    #[error("Key derivation failed: {0}")]
    Kdf(#[from] KdfError),
}

/// Session layer errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session layer unavailable: {message}")]
    Unavailable { message: String },

    #[error("Session no longer exists")]
    NotFound,
}
