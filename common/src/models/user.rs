// common/src/models/user.rs
use serde::{Deserialize, Serialize};

/// A stored login credential. Only the derived hash is kept, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique login name
    pub username: String,
    /// Base64 KDF output over (password, salt)
    pub password_hash: String,
    /// Base64 random salt generated when the record was created
    pub salt: String,
}
