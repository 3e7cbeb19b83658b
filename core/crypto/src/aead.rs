//! Per-chunk authenticated encryption using XChaCha20-Poly1305.
//!
//! XChaCha20-Poly1305 provides both confidentiality and authenticity, with a
//! 24-byte nonce that is safe for random generation. Every chunk gets its own
//! random nonce under a single-use file key.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use zeroize::Zeroizing;

use crate::entropy::fill_random;
use crate::keys::{FileKey, SecretBytes};
use lockbox_common::{Error, Result};

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

pub type Nonce = [u8; NONCE_SIZE];

/// Draw a fresh random nonce.
pub fn generate_nonce() -> Result<Nonce> {
    let mut nonce = [0u8; NONCE_SIZE];
    fill_random(&mut nonce)?;
    Ok(nonce)
}

/// Encrypt one chunk.
///
/// # Postconditions
/// - Returns ciphertext || tag, `plaintext.len() + TAG_SIZE` bytes
/// - `aad` is authenticated but not stored
///
/// # Security
/// - Caller is responsible for nonce uniqueness under `key`
pub fn encrypt_chunk(key: &FileKey, nonce: &Nonce, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    cipher
        .encrypt(XNonce::from_slice(nonce), Payload { msg: plaintext, aad })
        .map_err(|_| Error::Validation("Chunk exceeds the AEAD size limit".to_string()))
}

/// Decrypt one chunk.
///
/// # Errors
/// - `Authentication` if the tag does not verify under `key`, `nonce` and
///   `aad`, or `sealed` is shorter than a tag
///
/// # Security
/// - Authenticates before releasing any plaintext
pub fn decrypt_chunk(key: &FileKey, nonce: &Nonce, sealed: &[u8], aad: &[u8]) -> Result<SecretBytes> {
    if sealed.len() < TAG_SIZE {
        return Err(Error::Authentication);
    }

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    cipher
        .decrypt(XNonce::from_slice(nonce), Payload { msg: sealed, aad })
        .map(Zeroizing::new)
        .map_err(|_| Error::Authentication)
}
