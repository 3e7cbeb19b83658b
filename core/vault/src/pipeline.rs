//! File pipeline orchestrator.
//!
//! Drives salt generation, one key derivation per file, per-chunk sealing and
//! container assembly. Decryption is fail-closed: the first chunk that does
//! not authenticate aborts the run and no plaintext leaves this module.
//!
//! KDF and AEAD calls run on blocking workers. At most
//! [`PipelineConfig::parallel_chunks`] chunks are in flight; results are
//! consumed in chunk order, so output order never depends on scheduling.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::task::{self, JoinError};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::PipelineConfig;
use crate::format::{
    chunk_aad, chunk_count, parse_header, split_records, ContainerWriter, Header, HEADER_SIZE,
};
use crate::progress::{Progress, ProgressSink};
use lockbox_common::{Error, Result};
use lockbox_crypto::{
    decrypt_chunk, derive_file_key, encrypt_chunk, generate_nonce, with_ephemeral_context,
    FileKey, KdfParams, Nonce, Password, Salt, SecretBytes, NONCE_SIZE, TAG_SIZE,
};

/// Encrypts and decrypts whole files as vault containers.
#[derive(Debug, Clone)]
pub struct VaultPipeline {
    config: PipelineConfig,
}

impl VaultPipeline {
    /// Create a pipeline.
    ///
    /// # Errors
    /// - `Validation` if `config` is invalid
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Encrypt `plaintext` into a new container.
    ///
    /// # Postconditions
    /// - The container holds a fresh salt, the KDF parameters and one record
    ///   per chunk in plaintext order
    /// - The password and file key are wiped on every exit path
    ///
    /// # Errors
    /// - `Validation` if the password is empty
    /// - `Entropy` if the RNG fails
    /// - `Derivation` if the KDF fails
    pub async fn encrypt(
        &self,
        password: Password,
        plaintext: &[u8],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        with_ephemeral_context(self.seal(password, plaintext, progress)).await
    }

    /// Decrypt a container.
    ///
    /// # Postconditions
    /// - Returns the exact original plaintext, or an error and no plaintext
    ///
    /// # Errors
    /// - `Validation` if the password is empty
    /// - `Format` if the container is malformed, of an unknown version or
    ///   asks for a KDF cost above [`PipelineConfig::max_kdf`]; raised before
    ///   any key is derived
    /// - `Derivation` if the KDF fails
    /// - `Authentication` on the first chunk that fails verification
    pub async fn decrypt(
        &self,
        password: Password,
        container: &[u8],
        progress: &dyn ProgressSink,
    ) -> Result<SecretBytes> {
        with_ephemeral_context(self.open(password, container, progress)).await
    }

    /// Encrypt the file at `source` into a container at `dest`.
    ///
    /// Returns the container size in bytes.
    pub async fn encrypt_file(
        &self,
        password: Password,
        source: &Path,
        dest: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<u64> {
        let plaintext = Zeroizing::new(tokio::fs::read(source).await?);
        let container = self.encrypt(password, &plaintext, progress).await?;
        write_atomically(dest, &container).await?;
        Ok(container.len() as u64)
    }

    /// Decrypt the container at `source` into `dest`.
    ///
    /// `dest` is only created once every chunk has verified. Returns the
    /// plaintext size in bytes.
    pub async fn decrypt_file(
        &self,
        password: Password,
        source: &Path,
        dest: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<u64> {
        let container = tokio::fs::read(source).await?;
        let plaintext = self.decrypt(password, &container, progress).await?;
        write_atomically(dest, &plaintext).await?;
        Ok(plaintext.len() as u64)
    }

    async fn seal(
        &self,
        password: Password,
        plaintext: &[u8],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        if password.is_empty() {
            return Err(Error::Validation("Password cannot be empty".to_string()));
        }

        let chunk_size = self.config.chunk_size;
        let salt = Salt::generate()?;
        let header = Header::new(salt.clone(), self.config.kdf, chunk_size as u32);
        let header_bytes: Arc<[u8]> = Arc::from(&header.encode()[..]);

        debug!(stage = "derive", "Deriving file key");
        let key = Arc::new(derive_blocking(password, salt, self.config.kdf).await?);

        let total = chunk_count(plaintext.len(), chunk_size);
        let chunks: Vec<&[u8]> = if plaintext.is_empty() {
            vec![plaintext]
        } else {
            plaintext.chunks(chunk_size).collect()
        };

        let mut writer = ContainerWriter::new(
            &header,
            HEADER_SIZE + plaintext.len() + total * (NONCE_SIZE + TAG_SIZE),
        );
        let mut nonces: HashSet<Nonce> = HashSet::with_capacity(total);

        let mut sealed = stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| {
                let key = Arc::clone(&key);
                let header_bytes = Arc::clone(&header_bytes);
                let chunk = Zeroizing::new(chunk.to_vec());
                let is_final = index + 1 == total;

                task::spawn_blocking(move || -> Result<(Nonce, Vec<u8>)> {
                    let nonce = generate_nonce()?;
                    let aad = chunk_aad(&header_bytes, index as u64, is_final);
                    let ciphertext = encrypt_chunk(&key, &nonce, &chunk, &aad)?;
                    Ok((nonce, ciphertext))
                })
            })
            .buffered(self.config.parallel_chunks);

        let mut completed = 0;
        while let Some(joined) = sealed.next().await {
            let (nonce, ciphertext) = joined.map_err(worker_failed)??;
            if !nonces.insert(nonce) {
                return Err(Error::Entropy("nonce repeated under one key".to_string()));
            }

            writer.push_record(&nonce, &ciphertext);
            completed += 1;
            progress.report(Progress { completed, total });
        }

        let container = writer.finish();
        info!(
            stage = "encrypt",
            chunks = total,
            plaintext_bytes = plaintext.len(),
            container_bytes = container.len(),
            "Vault sealed"
        );
        Ok(container)
    }

    async fn open(
        &self,
        password: Password,
        container: &[u8],
        progress: &dyn ProgressSink,
    ) -> Result<SecretBytes> {
        if password.is_empty() {
            return Err(Error::Validation("Password cannot be empty".to_string()));
        }

        let (header, offset) = parse_header(container)?;
        let records = split_records(&header, &container[offset..])?;
        let header_bytes: Arc<[u8]> = Arc::from(&container[..offset]);
        debug!(
            stage = "parse",
            version = header.version,
            chunks = records.len(),
            "Container header accepted"
        );

        let kdf = header.kdf;
        kdf.check_within(&self.config.max_kdf).map_err(|e| {
            Error::Format(format!("container KDF cost exceeds configured limit: {}", e))
        })?;
        let key = Arc::new(derive_blocking(password, header.salt, kdf).await?);

        let total = records.len();
        let plaintext_len = records.iter().map(|r| r.sealed.len() - TAG_SIZE).sum();
        // Exact capacity: a reallocation would leave an unwiped copy behind.
        let mut plaintext: SecretBytes = Zeroizing::new(Vec::with_capacity(plaintext_len));

        let mut opened = stream::iter(records)
            .map(|record| {
                let key = Arc::clone(&key);
                let header_bytes = Arc::clone(&header_bytes);
                let (index, nonce, is_final) = (record.index, record.nonce, record.is_final);
                let sealed = record.sealed.to_vec();

                task::spawn_blocking(move || {
                    let aad = chunk_aad(&header_bytes, index, is_final);
                    decrypt_chunk(&key, &nonce, &sealed, &aad)
                })
            })
            .buffered(self.config.parallel_chunks);

        let mut completed = 0;
        while let Some(joined) = opened.next().await {
            let chunk = match joined.map_err(worker_failed)? {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(stage = "decrypt", chunk = completed, "Chunk failed verification");
                    return Err(e);
                }
            };

            plaintext.extend_from_slice(&chunk);
            completed += 1;
            progress.report(Progress { completed, total });
        }

        info!(
            stage = "decrypt",
            chunks = total,
            plaintext_bytes = plaintext.len(),
            "Vault opened"
        );
        Ok(plaintext)
    }
}

/// Derive the file key on a blocking worker.
///
/// The password is moved into the worker and wiped when derivation ends.
async fn derive_blocking(password: Password, salt: Salt, params: KdfParams) -> Result<FileKey> {
    task::spawn_blocking(move || derive_file_key(password.as_bytes(), &salt, &params))
        .await
        .map_err(worker_failed)?
}

fn worker_failed(e: JoinError) -> Error {
    Error::Internal(format!("worker task failed: {}", e))
}

/// Write `bytes` to a sibling temp file, then rename it over `dest`.
async fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    let mut name = dest
        .file_name()
        .ok_or_else(|| Error::Validation("Output path has no file name".to_string()))?
        .to_os_string();
    name.push(".partial");
    let tmp = dest.with_file_name(name);

    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        discard_partial(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, dest).await {
        discard_partial(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Remove a temp file left by a failed write. A missing file is fine.
async fn discard_partial(tmp: &Path) {
    match tokio::fs::remove_file(tmp).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %tmp.display(),
            error = %e,
            "Failed to remove partial output"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{inspect, FORMAT_VERSION, MAGIC};
    use crate::progress::NoProgress;
    use proptest::prelude::*;
    use std::sync::Mutex;

    const MIB: usize = 1024 * 1024;

    fn cheap_kdf() -> KdfParams {
        KdfParams::new(1, 1, 1).with_prehash_rounds(1_000)
    }

    fn pipeline(chunk_size: usize) -> VaultPipeline {
        VaultPipeline::new(PipelineConfig::new(cheap_kdf()).with_chunk_size(chunk_size)).unwrap()
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[tokio::test]
    async fn test_roundtrip_small() {
        let p = pipeline(16);
        let data = b"Hello, chunked vault encryption!".to_vec();

        let container = p.encrypt("pw".into(), &data, &NoProgress).await.unwrap();
        let plaintext = p.decrypt("pw".into(), &container, &NoProgress).await.unwrap();

        assert_eq!(plaintext.as_slice(), data.as_slice());
        assert_eq!(&container[..4], MAGIC);
        assert_eq!(container[4], FORMAT_VERSION);
    }

    #[tokio::test]
    async fn test_roundtrip_empty() {
        let p = pipeline(16);

        let container = p.encrypt("pw".into(), b"", &NoProgress).await.unwrap();
        assert_eq!(inspect(&container).unwrap().records, 1);

        let plaintext = p.decrypt("pw".into(), &container, &NoProgress).await.unwrap();
        assert!(plaintext.is_empty());
    }

    #[tokio::test]
    async fn test_roundtrip_exact_multiple_of_chunk_size() {
        let p = pipeline(16);
        let data = sample(64);

        let container = p.encrypt("pw".into(), &data, &NoProgress).await.unwrap();
        assert_eq!(inspect(&container).unwrap().records, 4);

        let plaintext = p.decrypt("pw".into(), &container, &NoProgress).await.unwrap();
        assert_eq!(plaintext.as_slice(), data.as_slice());
    }

    #[tokio::test]
    async fn test_two_and_a_half_mib_scenario() {
        let p = pipeline(MIB);
        let data = sample(5 * MIB / 2);

        let container = p
            .encrypt("correct-horse".into(), &data, &NoProgress)
            .await
            .unwrap();

        let info = inspect(&container).unwrap();
        assert_eq!(info.records, 3);
        assert_eq!(info.payload_bytes, data.len());

        let plaintext = p
            .decrypt("correct-horse".into(), &container, &NoProgress)
            .await
            .unwrap();
        assert_eq!(plaintext.as_slice(), data.as_slice());

        let wrong = p.decrypt("wrong-horse".into(), &container, &NoProgress).await;
        assert!(matches!(wrong, Err(Error::Authentication)));
    }

    #[tokio::test]
    async fn test_same_input_gives_distinct_containers() {
        let p = pipeline(16);
        let c1 = p.encrypt("pw".into(), b"same", &NoProgress).await.unwrap();
        let c2 = p.encrypt("pw".into(), b"same", &NoProgress).await.unwrap();

        // Fresh salt and nonces each time
        assert_ne!(c1[5..37], c2[5..37]);
        assert_ne!(c1, c2);
    }

    #[tokio::test]
    async fn test_every_ciphertext_bit_flip_fails() {
        let p = pipeline(8);
        let container = p.encrypt("pw".into(), b"twenty bytes of data", &NoProgress).await.unwrap();

        let records = split_records(
            &parse_header(&container).unwrap().0,
            &container[HEADER_SIZE..],
        )
        .unwrap();
        assert_eq!(records.len(), 3);

        // Every byte of every record's ciphertext and tag
        let mut pos = HEADER_SIZE;
        for record in &records {
            pos += NONCE_SIZE;
            for offset in 0..record.sealed.len() {
                let mut tampered = container.clone();
                tampered[pos + offset] ^= 1 << (offset % 8);
                let result = p.decrypt("pw".into(), &tampered, &NoProgress).await;
                assert!(matches!(result, Err(Error::Authentication)));
            }
            pos += record.sealed.len();
        }
    }

    #[tokio::test]
    async fn test_nonce_and_header_tampering_fails() {
        let p = pipeline(8);
        let container = p.encrypt("pw".into(), b"some data here", &NoProgress).await.unwrap();

        // Stored nonce of the first record
        let mut bad_nonce = container.clone();
        bad_nonce[HEADER_SIZE] ^= 0x80;
        assert!(matches!(
            p.decrypt("pw".into(), &bad_nonce, &NoProgress).await,
            Err(Error::Authentication)
        ));

        // Salt
        let mut bad_salt = container.clone();
        bad_salt[10] ^= 0x01;
        assert!(matches!(
            p.decrypt("pw".into(), &bad_salt, &NoProgress).await,
            Err(Error::Authentication)
        ));

        // Stored time cost 1 -> 2 stays plausible but changes the key
        let mut bad_params = container.clone();
        bad_params[41] = 2;
        assert!(matches!(
            p.decrypt("pw".into(), &bad_params, &NoProgress).await,
            Err(Error::Authentication)
        ));
    }

    #[tokio::test]
    async fn test_truncated_container_fails() {
        let p = pipeline(8);
        let data = sample(20);
        let container = p.encrypt("pw".into(), &data, &NoProgress).await.unwrap();

        // Drop the final record (4 bytes of plaintext)
        let last = NONCE_SIZE + 4 + TAG_SIZE;
        let truncated = &container[..container.len() - last];
        assert!(matches!(
            p.decrypt("pw".into(), truncated, &NoProgress).await,
            Err(Error::Authentication)
        ));

        // Header alone
        assert!(matches!(
            p.decrypt("pw".into(), &container[..HEADER_SIZE], &NoProgress).await,
            Err(Error::Format(_))
        ));
    }

    #[tokio::test]
    async fn test_reordered_records_fail() {
        let p = pipeline(8);
        let data = sample(24);
        let container = p.encrypt("pw".into(), &data, &NoProgress).await.unwrap();

        let full = NONCE_SIZE + 8 + TAG_SIZE;
        let first = HEADER_SIZE..HEADER_SIZE + full;
        let second = HEADER_SIZE + full..HEADER_SIZE + 2 * full;

        let mut swapped = container[..HEADER_SIZE].to_vec();
        swapped.extend_from_slice(&container[second]);
        swapped.extend_from_slice(&container[first]);
        swapped.extend_from_slice(&container[HEADER_SIZE + 2 * full..]);
        assert_eq!(swapped.len(), container.len());

        assert!(matches!(
            p.decrypt("pw".into(), &swapped, &NoProgress).await,
            Err(Error::Authentication)
        ));
    }

    #[tokio::test]
    async fn test_format_errors_precede_derivation() {
        let p = pipeline(8);
        let container = p.encrypt("pw".into(), b"data", &NoProgress).await.unwrap();

        let mut bad_magic = container.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            p.decrypt("pw".into(), &bad_magic, &NoProgress).await,
            Err(Error::Format(_))
        ));

        let mut bad_version = container;
        bad_version[4] = 2;
        assert!(matches!(
            p.decrypt("pw".into(), &bad_version, &NoProgress).await,
            Err(Error::Format(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_password_rejected() {
        let p = pipeline(8);
        assert!(matches!(
            p.encrypt("".into(), b"data", &NoProgress).await,
            Err(Error::Validation(_))
        ));

        let container = p.encrypt("pw".into(), b"data", &NoProgress).await.unwrap();
        assert!(matches!(
            p.decrypt("".into(), &container, &NoProgress).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_parallel_chunks_preserve_order() {
        let config = PipelineConfig::new(cheap_kdf())
            .with_chunk_size(32)
            .with_parallel_chunks(8);
        let parallel = VaultPipeline::new(config).unwrap();
        let sequential = pipeline(32);
        let data = sample(32 * 50 + 7);

        let container = parallel.encrypt("pw".into(), &data, &NoProgress).await.unwrap();
        assert_eq!(inspect(&container).unwrap().records, 51);

        // Decryption order does not depend on the parallelism used to encrypt
        let plaintext = sequential.decrypt("pw".into(), &container, &NoProgress).await.unwrap();
        assert_eq!(plaintext.as_slice(), data.as_slice());

        let plaintext = parallel.decrypt("pw".into(), &container, &NoProgress).await.unwrap();
        assert_eq!(plaintext.as_slice(), data.as_slice());
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let p = pipeline(10);
        let seen = Mutex::new(Vec::new());
        let sink = |progress: Progress| seen.lock().unwrap().push(progress);

        let container = p.encrypt("pw".into(), &sample(45), &sink).await.unwrap();
        let encrypt_seen = std::mem::take(&mut *seen.lock().unwrap());
        assert_eq!(
            encrypt_seen.iter().map(|p| p.completed).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert!(encrypt_seen.iter().all(|p| p.total == 5));

        p.decrypt("pw".into(), &container, &sink).await.unwrap();
        let decrypt_seen = seen.lock().unwrap();
        assert_eq!(decrypt_seen.len(), 5);
        assert!(decrypt_seen.last().unwrap().is_done());
    }

    #[tokio::test]
    async fn test_wrong_password_reports_no_progress() {
        let p = pipeline(10);
        let container = p.encrypt("right".into(), &sample(30), &NoProgress).await.unwrap();

        let seen = Mutex::new(Vec::new());
        let sink = |progress: Progress| seen.lock().unwrap().push(progress);
        let result = p.decrypt("wrong".into(), &container, &sink).await;

        assert!(matches!(result, Err(Error::Authentication)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("report.pdf");
        let sealed = dir.path().join("report.pdf.lockbox");
        let restored = dir.path().join("restored.pdf");
        let data = sample(5_000);
        tokio::fs::write(&source, &data).await.unwrap();

        let p = pipeline(1024);
        let size = p
            .encrypt_file("pw".into(), &source, &sealed, &NoProgress)
            .await
            .unwrap();
        assert_eq!(size, tokio::fs::metadata(&sealed).await.unwrap().len());

        let written = p
            .decrypt_file("pw".into(), &sealed, &restored, &NoProgress)
            .await
            .unwrap();
        assert_eq!(written, data.len() as u64);
        assert_eq!(tokio::fs::read(&restored).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_failed_decrypt_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("plain.txt");
        let sealed = dir.path().join("plain.txt.lockbox");
        let restored = dir.path().join("restored.txt");
        tokio::fs::write(&source, b"top secret").await.unwrap();

        let p = pipeline(4);
        p.encrypt_file("correct-horse".into(), &source, &sealed, &NoProgress)
            .await
            .unwrap();

        let result = p
            .decrypt_file("wrong-horse".into(), &sealed, &restored, &NoProgress)
            .await;
        assert!(matches!(result, Err(Error::Authentication)));
        assert!(!restored.exists());
        assert!(!dir.path().join("restored.txt.partial").exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_failed_write_removes_partial() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("restored.txt");
        let tmp = dir.path().join("restored.txt.partial");
        // Writes through the link fail with ENOSPC
        std::os::unix::fs::symlink(full, &tmp).unwrap();

        let result = write_atomically(&dest, b"plaintext that must not linger").await;

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(std::fs::symlink_metadata(&tmp).is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_partial() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("restored");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("occupied"), b"x").unwrap();

        let result = write_atomically(&dest, b"plaintext").await;

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!dir.path().join("restored.partial").exists());
        assert!(dest.join("occupied").exists());
    }

    #[tokio::test]
    async fn test_kdf_cost_above_limit_rejected_before_derivation() {
        let salt = Salt::from_bytes([7u8; 32]);
        let greedy = KdfParams::new(4096, 64, 16).with_prehash_rounds(10_000_000);
        let mut container = Header::new(salt, greedy, 16).encode().to_vec();
        container.extend_from_slice(&[0u8; NONCE_SIZE + TAG_SIZE]);

        let result = pipeline(16).decrypt("pw".into(), &container, &NoProgress).await;
        match result {
            Err(Error::Format(msg)) => assert!(msg.contains("memory_cost_mib")),
            other => panic!("expected Format error, got {:?}", other.map(|p| p.len())),
        }
    }

    #[tokio::test]
    async fn test_configured_kdf_limit_applies_to_decrypt() {
        let heavier = KdfParams::new(1, 1, 1).with_prehash_rounds(5_000);
        let sealer = VaultPipeline::new(PipelineConfig::new(heavier).with_chunk_size(16)).unwrap();
        let container = sealer.encrypt("pw".into(), b"limited", &NoProgress).await.unwrap();

        let strict = VaultPipeline::new(
            PipelineConfig::new(cheap_kdf()).with_max_kdf(cheap_kdf().with_prehash_rounds(2_000)),
        )
        .unwrap();
        let result = strict.decrypt("pw".into(), &container, &NoProgress).await;
        assert!(matches!(result, Err(Error::Format(_))));

        let plaintext = sealer.decrypt("pw".into(), &container, &NoProgress).await.unwrap();
        assert_eq!(plaintext.as_slice(), b"limited");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..300), chunk_size in 1usize..64) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let p = pipeline(chunk_size);
            let plaintext = rt.block_on(async {
                let container = p.encrypt("prop".into(), &data, &NoProgress).await.unwrap();
                p.decrypt("prop".into(), &container, &NoProgress).await.unwrap()
            });
            prop_assert_eq!(plaintext.as_slice(), data.as_slice());
        }
    }
}
