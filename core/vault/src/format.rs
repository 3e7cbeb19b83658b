//! Vault container format.
//!
//! Version 1 layout, integers little-endian:
//!
//! ```text
//! MAGIC "LKBX"        4 bytes
//! VERSION             1 byte
//! SALT                32 bytes
//! memory_cost_mib     u32
//! time_cost           u32
//! parallelism         u32
//! prehash_rounds      u32
//! chunk_size          u32
//! records             { NONCE(24) || CIPHERTEXT || TAG(16) }+
//! ```
//!
//! Every record except the last carries exactly `chunk_size` bytes of
//! ciphertext. KDF parameters live in the header so decryption can reproduce
//! the key; the derived key length is fixed at 32 bytes by version 1.

use serde::Serialize;

use lockbox_common::{Error, Result};
use lockbox_crypto::{KdfParams, Nonce, Salt, KEY_LENGTH, NONCE_SIZE, SALT_LENGTH, TAG_SIZE};

/// Marker identifying a vault container.
pub const MAGIC: &[u8; 4] = b"LKBX";

/// The only container version this parser accepts.
pub const FORMAT_VERSION: u8 = 1;

/// Encoded size of a version 1 header.
pub const HEADER_SIZE: usize = MAGIC.len() + 1 + SALT_LENGTH + 5 * 4;

/// Largest chunk size a container may declare (64 MiB).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Smallest well-formed record: a nonce and the tag of an empty chunk.
pub const MIN_RECORD_SIZE: usize = NONCE_SIZE + TAG_SIZE;

const VERSION_OFFSET: usize = MAGIC.len();
const SALT_OFFSET: usize = VERSION_OFFSET + 1;
const PARAMS_OFFSET: usize = SALT_OFFSET + SALT_LENGTH;

/// Parsed container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub salt: Salt,
    pub kdf: KdfParams,
    pub chunk_size: u32,
}

impl Header {
    /// Create a current-version header.
    pub fn new(salt: Salt, kdf: KdfParams, chunk_size: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            salt,
            kdf,
            chunk_size,
        }
    }

    /// Serialize the header.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..VERSION_OFFSET].copy_from_slice(MAGIC);
        out[VERSION_OFFSET] = self.version;
        out[SALT_OFFSET..PARAMS_OFFSET].copy_from_slice(self.salt.as_bytes());

        let fields = [
            self.kdf.memory_cost_mib,
            self.kdf.time_cost,
            self.kdf.parallelism,
            self.kdf.prehash_rounds,
            self.chunk_size,
        ];
        for (slot, value) in out[PARAMS_OFFSET..].chunks_exact_mut(4).zip(fields) {
            slot.copy_from_slice(&value.to_le_bytes());
        }

        out
    }

    /// Size of a full (non-final) record.
    pub fn full_record_size(&self) -> usize {
        NONCE_SIZE + self.chunk_size as usize + TAG_SIZE
    }
}

/// Parse and validate a container header.
///
/// Checks run in order: magic, version, length, stored parameters. No
/// cryptographic work happens here.
///
/// # Returns
/// The header and the byte offset where chunk records begin.
///
/// # Errors
/// - `Format` if the magic marker is wrong, the version is not
///   [`FORMAT_VERSION`], the header is truncated, or the stored parameters are
///   outside the accepted ranges
pub fn parse_header(bytes: &[u8]) -> Result<(Header, usize)> {
    if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::Format("not a vault container".to_string()));
    }

    let version = *bytes
        .get(VERSION_OFFSET)
        .ok_or_else(|| Error::Format("truncated header: missing version".to_string()))?;
    if version != FORMAT_VERSION {
        return Err(Error::Format(format!(
            "unsupported container version {}",
            version
        )));
    }

    if bytes.len() < HEADER_SIZE {
        return Err(Error::Format(format!(
            "truncated header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut salt = [0u8; SALT_LENGTH];
    salt.copy_from_slice(&bytes[SALT_OFFSET..PARAMS_OFFSET]);

    let mut fields = [0u32; 5];
    for (value, raw) in fields
        .iter_mut()
        .zip(bytes[PARAMS_OFFSET..HEADER_SIZE].chunks_exact(4))
    {
        let mut word = [0u8; 4];
        word.copy_from_slice(raw);
        *value = u32::from_le_bytes(word);
    }
    let [memory_cost_mib, time_cost, parallelism, prehash_rounds, chunk_size] = fields;

    let kdf = KdfParams {
        memory_cost_mib,
        time_cost,
        parallelism,
        output_length: KEY_LENGTH,
        prehash_rounds,
    };
    kdf.validate()
        .map_err(|e| Error::Format(format!("implausible KDF parameters: {}", e)))?;

    if chunk_size == 0 || chunk_size as usize > MAX_CHUNK_SIZE {
        return Err(Error::Format(format!(
            "implausible chunk size {}",
            chunk_size
        )));
    }

    Ok((Header::new(Salt::from_bytes(salt), kdf, chunk_size), HEADER_SIZE))
}

/// One encrypted chunk as stored in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord<'a> {
    pub index: u64,
    pub nonce: Nonce,
    /// Ciphertext followed by its tag.
    pub sealed: &'a [u8],
    pub is_final: bool,
}

/// Split a container body into its chunk records.
///
/// This is a structural check only; authenticity is established by
/// decryption.
///
/// # Errors
/// - `Format` if the body is empty or the last record is shorter than a
///   nonce and a tag
pub fn split_records<'a>(header: &Header, body: &'a [u8]) -> Result<Vec<ChunkRecord<'a>>> {
    if body.is_empty() {
        return Err(Error::Format("container has no chunk records".to_string()));
    }

    let full = header.full_record_size();
    let mut records = Vec::with_capacity(body.len().div_ceil(full));
    let mut rest = body;
    let mut index = 0u64;

    loop {
        let is_final = rest.len() <= full;
        let take = if is_final { rest.len() } else { full };
        if take < MIN_RECORD_SIZE {
            return Err(Error::Format(format!(
                "truncated chunk record {}: {} bytes",
                index, take
            )));
        }

        let (record, tail) = rest.split_at(take);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&record[..NONCE_SIZE]);
        records.push(ChunkRecord {
            index,
            nonce,
            sealed: &record[NONCE_SIZE..],
            is_final,
        });

        if is_final {
            return Ok(records);
        }
        rest = tail;
        index += 1;
    }
}

/// Associated data for one chunk: the encoded header, the chunk index and
/// whether it is the last chunk.
///
/// Binding these prevents reordering, truncation and header tampering.
pub fn chunk_aad(header: &[u8], index: u64, is_final: bool) -> Vec<u8> {
    let mut aad = Vec::with_capacity(header.len() + 9);
    aad.extend_from_slice(header);
    aad.extend_from_slice(&index.to_be_bytes());
    aad.push(u8::from(is_final));
    aad
}

/// Number of chunks a plaintext of `len` bytes is split into.
///
/// An empty plaintext still produces one (empty, final) chunk.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    len.div_ceil(chunk_size).max(1)
}

/// Assembles a container from a header and records appended in order.
pub struct ContainerWriter {
    buf: Vec<u8>,
}

impl ContainerWriter {
    /// Start a container with `header`; `capacity` is a size hint in bytes.
    pub fn new(header: &Header, capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity.max(HEADER_SIZE));
        buf.extend_from_slice(&header.encode());
        Self { buf }
    }

    /// Append the next record.
    pub fn push_record(&mut self, nonce: &Nonce, sealed: &[u8]) {
        self.buf.extend_from_slice(nonce);
        self.buf.extend_from_slice(sealed);
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Non-secret description of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub version: u8,
    pub kdf: KdfParams,
    pub chunk_size: u32,
    pub records: usize,
    pub payload_bytes: usize,
    pub container_bytes: usize,
}

/// Describe a container without decrypting it.
pub fn inspect(bytes: &[u8]) -> Result<ContainerInfo> {
    let (header, offset) = parse_header(bytes)?;
    let records = split_records(&header, &bytes[offset..])?;
    let payload_bytes = records.iter().map(|r| r.sealed.len() - TAG_SIZE).sum();

    Ok(ContainerInfo {
        version: header.version,
        kdf: header.kdf,
        chunk_size: header.chunk_size,
        records: records.len(),
        payload_bytes,
        container_bytes: bytes.len(),
    })
}
