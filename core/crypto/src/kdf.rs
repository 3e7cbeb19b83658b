//! Two-stage key derivation.
//!
//! Stage one pre-hardens the password with PBKDF2-HMAC-SHA512 into a 256-bit
//! intermediate. Stage two feeds that intermediate to Argon2id, a memory-hard
//! function resistant to GPU and time-memory trade-off attacks.
//!
//! The derivation is a pure function of (password, salt, params): decryption
//! reconstructs the key from the salt and parameters stored in the container.

use std::fmt::Display;
use std::ops::RangeInclusive;

use argon2::{Algorithm, Argon2, Block, Params, Version};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::keys::{FileKey, Salt, SecretBytes, KEY_LENGTH};
use lockbox_common::{Error, Result};

/// Length of the pre-hardened intermediate (256-bit).
pub const PREHASH_LENGTH: usize = 32;

/// Default PBKDF2-HMAC-SHA512 iteration count.
pub const DEFAULT_PREHASH_ROUNDS: u32 = 210_000;

pub const MEMORY_COST_MIB_RANGE: RangeInclusive<u32> = 1..=4096;
pub const TIME_COST_RANGE: RangeInclusive<u32> = 1..=64;
pub const PARALLELISM_RANGE: RangeInclusive<u32> = 1..=16;
pub const PREHASH_ROUNDS_RANGE: RangeInclusive<u32> = 1..=10_000_000;
pub const OUTPUT_LENGTH_RANGE: RangeInclusive<usize> = 16..=64;

/// Parameters for the KDF hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Argon2id memory cost in MiB.
    pub memory_cost_mib: u32,
    /// Argon2id iterations.
    pub time_cost: u32,
    /// Argon2id lanes.
    pub parallelism: u32,
    /// Derived key length in bytes.
    pub output_length: usize,
    /// PBKDF2-HMAC-SHA512 iterations for the pre-hardening stage.
    pub prehash_rounds: u32,
}

impl KdfParams {
    /// Create parameters with the default output length and pre-hash rounds.
    pub fn new(memory_cost_mib: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost_mib,
            time_cost,
            parallelism,
            output_length: KEY_LENGTH,
            prehash_rounds: DEFAULT_PREHASH_ROUNDS,
        }
    }

    /// Create parameters suitable for interactive use.
    ///
    /// Targets roughly one second of derivation on a desktop machine.
    pub fn interactive() -> Self {
        Self::new(64, 3, 1)
    }

    /// Create moderate parameters for constrained devices.
    pub fn moderate() -> Self {
        Self::new(32, 3, 1)
    }

    /// Create parameters suitable for sensitive data.
    ///
    /// Higher security parameters that may take several seconds.
    pub fn sensitive() -> Self {
        Self::new(128, 4, 1)
    }

    /// Look up a preset by name: "interactive", "moderate" or "sensitive".
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "interactive" => Some(Self::interactive()),
            "moderate" => Some(Self::moderate()),
            "sensitive" => Some(Self::sensitive()),
            _ => None,
        }
    }

    /// Set the derived key length.
    pub fn with_output_length(mut self, output_length: usize) -> Self {
        self.output_length = output_length;
        self
    }

    /// Set the pre-hardening iteration count.
    pub fn with_prehash_rounds(mut self, rounds: u32) -> Self {
        self.prehash_rounds = rounds;
        self
    }

    /// Argon2id memory cost in KiB.
    pub fn memory_cost_kib(&self) -> u32 {
        self.memory_cost_mib * 1024
    }

    /// Check every parameter against its accepted range.
    ///
    /// # Errors
    /// - `Validation` naming the first out-of-range parameter
    pub fn validate(&self) -> Result<()> {
        check_range("memory_cost_mib", self.memory_cost_mib, &MEMORY_COST_MIB_RANGE)?;
        check_range("time_cost", self.time_cost, &TIME_COST_RANGE)?;
        check_range("parallelism", self.parallelism, &PARALLELISM_RANGE)?;
        check_range("output_length", self.output_length, &OUTPUT_LENGTH_RANGE)?;
        check_range("prehash_rounds", self.prehash_rounds, &PREHASH_ROUNDS_RANGE)?;
        Ok(())
    }

    /// Check that no cost parameter exceeds the matching one in `limit`.
    ///
    /// # Errors
    /// - `Validation` naming the first parameter above its limit
    pub fn check_within(&self, limit: &KdfParams) -> Result<()> {
        let costs = [
            ("memory_cost_mib", self.memory_cost_mib, limit.memory_cost_mib),
            ("time_cost", self.time_cost, limit.time_cost),
            ("parallelism", self.parallelism, limit.parallelism),
            ("prehash_rounds", self.prehash_rounds, limit.prehash_rounds),
        ];

        for (name, value, max) in costs {
            if value > max {
                return Err(Error::Validation(format!(
                    "{} {} exceeds the limit of {}",
                    name, value, max
                )));
            }
        }
        Ok(())
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::interactive()
    }
}

fn check_range<T>(name: &str, value: T, range: &RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be within {}..={}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

/// Derive key material from a password and salt.
///
/// # Preconditions
/// - `password` must not be empty
/// - `params` must pass [`KdfParams::validate`]
///
/// # Postconditions
/// - Returns `params.output_length` bytes that wipe themselves on drop
/// - The derived key is deterministic given the same inputs
///
/// # Errors
/// - `Validation` if the password is empty or a parameter is out of range
/// - `Derivation` if Argon2id rejects its parameters or fails
///
/// # Security
/// - The pre-hardened intermediate and the Argon2 working memory are wiped on
///   both the success and the failure path
pub fn derive_key(password: &[u8], salt: &Salt, params: &KdfParams) -> Result<SecretBytes> {
    if password.is_empty() {
        return Err(Error::Validation("Password cannot be empty".to_string()));
    }
    params.validate()?;

    let mut prehashed = Zeroizing::new([0u8; PREHASH_LENGTH]);
    pbkdf2_hmac::<Sha512>(
        password,
        salt.as_bytes(),
        params.prehash_rounds,
        &mut prehashed[..],
    );

    let output = memory_hard(&prehashed[..], salt, params)?;

    debug!(
        memory_cost_mib = params.memory_cost_mib,
        time_cost = params.time_cost,
        parallelism = params.parallelism,
        "Key derived"
    );

    Ok(output)
}

/// Argon2id stage of [`derive_key`].
///
/// Argon2 enforces its own minimums (time cost, lanes, memory per lane,
/// output length). [`KdfParams::validate`] ranges sit inside them, so callers
/// going through [`derive_key`] only reach `Derivation` on an Argon2 failure.
fn memory_hard(prehashed: &[u8], salt: &Salt, params: &KdfParams) -> Result<SecretBytes> {
    let argon2_params = Params::new(
        params.memory_cost_kib(),
        params.time_cost,
        params.parallelism,
        Some(params.output_length),
    )
    .map_err(|e| Error::Derivation(format!("Invalid KDF parameters: {}", e)))?;

    let mut memory = vec![Block::default(); argon2_params.block_count()];
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut output = Zeroizing::new(vec![0u8; params.output_length]);
    let status = argon2.hash_password_into_with_memory(
        prehashed,
        salt.as_bytes(),
        output.as_mut_slice(),
        memory.as_mut_slice(),
    );
    memory.zeroize();
    status.map_err(|e| Error::Derivation(format!("Key derivation failed: {}", e)))?;

    Ok(output)
}

/// Derive a 256-bit file key.
///
/// # Errors
/// - `Validation` if `params.output_length` is not KEY_LENGTH
/// - Any error from [`derive_key`]
pub fn derive_file_key(password: &[u8], salt: &Salt, params: &KdfParams) -> Result<FileKey> {
    if params.output_length != KEY_LENGTH {
        return Err(Error::Validation(format!(
            "File keys must be {} bytes, got output_length {}",
            KEY_LENGTH, params.output_length
        )));
    }
    FileKey::from_secret(derive_key(password, salt, params)?)
}
