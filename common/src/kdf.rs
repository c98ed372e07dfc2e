//! PBKDF2 password hashing with a fixed work factor.
//!
//! Parameters match the scheme the stored records were created with:
//! HMAC-SHA1, 10 000 iterations, a 128-byte key and a 128-byte random salt.
//! Salt and hash are kept base64-encoded, and the encoded salt string itself
//! is the PBKDF2 salt input.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::error::KdfError;

pub const KDF_ITERATIONS: u32 = 10_000;
pub const KEY_LENGTH: usize = 128;
pub const SALT_LENGTH: usize = 128;

/// Key-derivation function. Not configurable: hashing and verification must
/// always run with the same parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kdf {
    iterations: u32,
    key_length: usize,
    salt_length: usize,
}

impl Default for Kdf {
    fn default() -> Self {
        Self {
            iterations: KDF_ITERATIONS,
            key_length: KEY_LENGTH,
            salt_length: SALT_LENGTH,
        }
    }
}

impl Kdf {
    /// Generate a fresh base64 salt from the OS random source
    pub fn generate_salt(&self) -> String {
        let mut bytes = vec![0u8; self.salt_length];
        OsRng.fill_bytes(&mut bytes);
        base64::encode(bytes)
    }

    /// Derive the base64 hash for `password` under `salt`
    pub fn derive(&self, password: &str, salt: &str) -> String {
        let mut key = vec![0u8; self.key_length];
        pbkdf2_hmac::<Sha1>(password.as_bytes(), salt.as_bytes(), self.iterations, &mut key);
        base64::encode(key)
    }

    /// Run `derive` on the blocking pool so request workers keep serving
    pub async fn derive_blocking(&self, password: String, salt: String) -> Result<String, KdfError> {
        let kdf = *self;
        tokio::task::spawn_blocking(move || kdf.derive(&password, &salt))
            .await
            .map_err(|e| KdfError::Task {
                message: e.to_string(),
            })
    }
}

/// Compare two encoded hashes without short-circuiting on the first difference
pub fn hashes_match(candidate: &str, stored: &str) -> bool {
    bool::from(candidate.as_bytes().ct_eq(stored.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let kdf = Kdf::default();
        let salt = kdf.generate_salt();
        assert_eq!(kdf.derive("testingPassword", &salt), kdf.derive("testingPassword", &salt));
    }

    #[test]
    fn test_salt_changes_hash() {
        let kdf = Kdf::default();
        let first = kdf.derive("testingPassword", &kdf.generate_salt());
        let second = kdf.derive("testingPassword", &kdf.generate_salt());
        assert_ne!(first, second);
    }

    #[test]
    fn test_password_changes_hash() {
        let kdf = Kdf::default();
        let salt = kdf.generate_salt();
        assert_ne!(kdf.derive("testingPassword", &salt), kdf.derive("wrong", &salt));
    }

    #[test]
    fn test_encoded_lengths() {
        let kdf = Kdf::default();
        let salt = kdf.generate_salt();
        // 128 bytes base64-encode to 172 characters
        assert_eq!(salt.len(), 172);
        assert_eq!(kdf.derive("pw", &salt).len(), 172);
    }

    #[test]
    fn test_hashes_match() {
        assert!(hashes_match("abc", "abc"));
        assert!(!hashes_match("abc", "abd"));
        assert!(!hashes_match("abc", "abcd"));
        assert!(!hashes_match("", "a"));
    }

    #[tokio::test]
    async fn test_derive_blocking_matches_inline() {
        let kdf = Kdf::default();
        let salt = kdf.generate_salt();
        let inline = kdf.derive("pw", &salt);
        let offloaded = kdf.derive_blocking("pw".to_string(), salt).await.unwrap();
        assert_eq!(inline, offloaded);
    }
}
