//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::MAX_CHUNK_SIZE;
use lockbox_common::{Error, Result};
use lockbox_crypto::{KdfParams, KEY_LENGTH};

/// Default plaintext chunk size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Upper bound on chunks processed concurrently.
pub const MAX_PARALLEL_CHUNKS: usize = 64;

/// Default ceiling on the KDF cost a container may ask for when decrypting.
pub fn default_max_kdf() -> KdfParams {
    KdfParams::new(1024, 16, 8).with_prehash_rounds(1_000_000)
}

/// Settings for one [`VaultPipeline`](crate::VaultPipeline).
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Plaintext bytes per chunk; the last chunk may be shorter.
    pub chunk_size: usize,
    /// Chunks in flight at once. Output order is preserved regardless.
    pub parallel_chunks: usize,
    /// KDF parameters used when encrypting. Decryption reads them from the
    /// container header instead.
    pub kdf: KdfParams,
    /// Highest KDF cost accepted from a container header. `kdf` must also
    /// stay within it. Fields left out of a JSON `max_kdf` object take the
    /// `KdfParams` defaults, not the defaults of this ceiling.
    pub max_kdf: KdfParams,
}

impl PipelineConfig {
    /// Create a configuration with the given KDF parameters.
    pub fn new(kdf: KdfParams) -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel_chunks: 1,
            kdf,
            max_kdf: default_max_kdf(),
        }
    }

    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set how many chunks may be processed concurrently.
    pub fn with_parallel_chunks(mut self, parallel_chunks: usize) -> Self {
        self.parallel_chunks = parallel_chunks;
        self
    }

    /// Set the highest KDF cost accepted when decrypting.
    pub fn with_max_kdf(mut self, max_kdf: KdfParams) -> Self {
        self.max_kdf = max_kdf;
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    /// - `Validation` if the chunk size or parallelism is out of range, the
    ///   KDF parameters are invalid or above `max_kdf`, or the KDF output is
    ///   not a 256-bit key
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::Validation(format!(
                "chunk_size must be within 1..={}, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }

        if self.parallel_chunks == 0 || self.parallel_chunks > MAX_PARALLEL_CHUNKS {
            return Err(Error::Validation(format!(
                "parallel_chunks must be within 1..={}, got {}",
                MAX_PARALLEL_CHUNKS, self.parallel_chunks
            )));
        }

        self.kdf.validate()?;
        if self.kdf.output_length != KEY_LENGTH {
            return Err(Error::Validation(format!(
                "Container keys are {} bytes, got output_length {}",
                KEY_LENGTH, self.kdf.output_length
            )));
        }

        self.max_kdf.validate()?;
        self.kdf.check_within(&self.max_kdf)?;

        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(KdfParams::default())
    }
}
