//! Cryptographic primitives for Lockbox.
//!
//! This module provides:
//! - An OS-backed entropy source with a timing-noise mixer
//! - Memory hygiene helpers: zeroization, isolation, constant-time equality
//! - Two-stage key derivation: PBKDF2-HMAC-SHA512 feeding Argon2id
//! - Per-chunk authenticated encryption using XChaCha20-Poly1305
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No password or key material is ever logged
//! - Constant-time operations for sensitive comparisons

pub mod aead;
pub mod entropy;
pub mod hygiene;
pub mod kdf;
pub mod keys;

pub use aead::{decrypt_chunk, encrypt_chunk, generate_nonce, Nonce, NONCE_SIZE, TAG_SIZE};
pub use entropy::{fill_random, mix_entropy, random_bytes};
pub use hygiene::{constant_time_eq, isolate_buffer, with_ephemeral_context, zeroize, zeroize_all};
pub use kdf::{derive_file_key, derive_key, KdfParams};
pub use keys::{FileKey, Password, Salt, SecretBytes, KEY_LENGTH, SALT_LENGTH};
