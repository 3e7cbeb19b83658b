//! Entropy source.
//!
//! All randomness comes from the operating system CSPRNG. [`mix_entropy`] is a
//! defense-in-depth layer against a degraded host RNG and never replaces it.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use blake2::digest::consts::U32;
use blake2::digest::generic_array::GenericArray;
use blake2::{Blake2b, Digest};
use once_cell::sync::OnceCell;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroize;

use lockbox_common::{Error, Result};

/// Bytes drawn by the one-time RNG health check.
const HEALTH_SAMPLE_LEN: usize = 64;

/// Length of the noise word XORed into primary entropy.
const NOISE_LEN: usize = 32;

/// Wall clock (16 bytes) plus four monotonic jitter samples (8 bytes each).
const TIMING_SAMPLE_LEN: usize = 48;

/// Spin iterations between jitter samples.
const JITTER_SPINS: u64 = 64;

static RNG_HEALTH: OnceCell<()> = OnceCell::new();

/// Run the OS RNG health check exactly once per process.
///
/// Concurrent first callers block on the same initialization; a failed check
/// is not cached, so a transient failure is retried on the next request.
fn ensure_healthy() -> Result<()> {
    RNG_HEALTH
        .get_or_try_init(|| {
            let mut sample = [0u8; HEALTH_SAMPLE_LEN];
            OsRng
                .try_fill_bytes(&mut sample)
                .map_err(|e| Error::Entropy(format!("OS RNG unavailable: {}", e)))?;

            let degenerate = sample.iter().all(|b| *b == sample[0]);
            sample.zeroize();
            if degenerate {
                return Err(Error::Entropy(
                    "OS RNG returned a constant block".to_string(),
                ));
            }

            debug!("OS RNG health check passed");
            Ok(())
        })
        .map(|_| ())
}

/// Fill `buf` with cryptographically secure random bytes.
///
/// # Errors
/// - `Entropy` if the OS RNG fails or its health check fails
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    ensure_healthy()?;
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::Entropy(format!("Failed to read OS RNG: {}", e)))
}

/// Return `n` cryptographically secure random bytes.
///
/// # Errors
/// - `Validation` if `n` is zero
/// - `Entropy` if the OS RNG fails
pub fn random_bytes(n: usize) -> Result<Vec<u8>> {
    if n == 0 {
        return Err(Error::Validation(
            "Random byte count must be positive".to_string(),
        ));
    }

    let mut out = vec![0u8; n];
    fill_random(&mut out)?;
    Ok(out)
}

/// XOR `primary` in place with a timing-derived noise word.
///
/// The timing sample and the noise word are wiped before returning.
pub fn mix_entropy(primary: &mut [u8]) {
    let mut timing = timing_sample();
    let mut noise = [0u8; NOISE_LEN];

    let mut hasher = Blake2b::<U32>::new();
    hasher.update(&timing);
    hasher.finalize_into(GenericArray::from_mut_slice(&mut noise));

    for (i, byte) in primary.iter_mut().enumerate() {
        *byte ^= noise[i % NOISE_LEN];
    }

    timing.zeroize();
    noise.zeroize();
}

fn timing_sample() -> [u8; TIMING_SAMPLE_LEN] {
    let mut sample = [0u8; TIMING_SAMPLE_LEN];

    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    sample[..16].copy_from_slice(&wall.to_le_bytes());

    let origin = Instant::now();
    let mut acc = wall as u64;
    for slot in sample[16..].chunks_exact_mut(8) {
        for i in 0..JITTER_SPINS {
            acc = acc.wrapping_mul(6364136223846793005).wrapping_add(i);
        }
        std::hint::black_box(acc);
        let nanos = origin.elapsed().as_nanos() as u64;
        slot.copy_from_slice(&nanos.to_le_bytes());
    }

    sample
}
