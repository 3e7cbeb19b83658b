//! Key types with secure memory handling.
//!
//! Password and key types zeroize their memory on drop, are not `Clone`, and
//! redact themselves in `Debug` output.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::entropy::{fill_random, mix_entropy};
use lockbox_common::{Error, Result};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of key-derivation salts in bytes.
pub const SALT_LENGTH: usize = 32;

/// Variable-length secret bytes that wipe themselves on drop.
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// User-supplied password.
///
/// Owned by exactly one pipeline invocation and wiped when it is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Password {
    bytes: Vec<u8>,
}

impl Password {
    /// Take ownership of a password string without copying it.
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            bytes: password.into().into_bytes(),
        }
    }

    /// Get the password bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self::new(password)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password([REDACTED])")
    }
}

/// Key for encrypting the chunks of one file.
///
/// Derived once per pipeline invocation and never reused across files.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct FileKey {
    key: [u8; KEY_LENGTH],
}

impl FileKey {
    /// Create a file key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Take a file key out of derived secret bytes.
    ///
    /// # Errors
    /// - `Validation` if `secret` is not exactly KEY_LENGTH bytes
    pub fn from_secret(secret: SecretBytes) -> Result<Self> {
        if secret.len() != KEY_LENGTH {
            return Err(Error::Validation(format!(
                "Invalid key length: expected {}, got {}",
                KEY_LENGTH,
                secret.len()
            )));
        }

        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(&secret);
        Ok(Self { key })
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileKey([REDACTED])")
    }
}

/// Salt for key derivation. Not secret, but unique per encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Generate a fresh salt from the OS RNG, mixed with timing noise.
    pub fn generate() -> Result<Self> {
        let mut salt = [0u8; SALT_LENGTH];
        fill_random(&mut salt)?;
        mix_entropy(&mut salt);
        Ok(Self(salt))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_generate() {
        let salt1 = Salt::generate().unwrap();
        let salt2 = Salt::generate().unwrap();

        // Random salts should be different
        assert_ne!(salt1.as_bytes(), salt2.as_bytes());
    }

    #[test]
    fn test_file_key_from_secret() {
        let secret = Zeroizing::new(vec![9u8; KEY_LENGTH]);
        let key = FileKey::from_secret(secret).unwrap();
        assert_eq!(key.as_bytes(), &[9u8; KEY_LENGTH]);
    }

    #[test]
    fn test_file_key_from_secret_wrong_length() {
        let secret = Zeroizing::new(vec![9u8; 64]);
        assert!(matches!(
            FileKey::from_secret(secret),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::new("correct-horse");
        let key = FileKey::from_bytes([1u8; KEY_LENGTH]);
        assert_eq!(format!("{:?}", password), "Password([REDACTED])");
        assert_eq!(format!("{:?}", key), "FileKey([REDACTED])");
    }

    #[test]
    fn test_password_explicit_wipe() {
        let mut password = Password::from("correct-horse");
        assert!(!password.is_empty());
        password.zeroize();
        assert!(password.is_empty());
    }
}
