//! Memory hygiene for secret-bearing buffers.
//!
//! Wiping goes through the `zeroize` crate so the compiler cannot elide the
//! writes. Comparisons over secret-derived data go through `subtle`.

use std::future::Future;
use std::ops::RangeInclusive;
use std::time::Duration;

use rand::rngs::OsRng;
use rand::Rng;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

/// Range, in milliseconds, of the delay injected after an ephemeral context.
pub const EPHEMERAL_DELAY_MS: RangeInclusive<u64> = 1..=8;

/// Overwrite every byte of `buf` with zero.
pub fn zeroize(buf: &mut [u8]) {
    buf.zeroize();
}

/// Wipe each buffer in order.
pub fn zeroize_all(bufs: &mut [&mut [u8]]) {
    for buf in bufs.iter_mut() {
        buf.zeroize();
    }
}

/// Return an independent copy of `buf`.
///
/// Use this when data must stay readable after another holder wipes its copy.
/// The copy wipes itself on drop.
pub fn isolate_buffer(buf: &[u8]) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(buf.to_vec())
}

/// Compare two byte slices in constant time.
///
/// Lengths are compared first; contents are then compared without early exit.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Run `op`, then sleep a random delay from [`EPHEMERAL_DELAY_MS`] before
/// handing back its output, whether that output is a success or an error.
pub async fn with_ephemeral_context<F, T>(op: F) -> T
where
    F: Future<Output = T>,
{
    let output = op.await;
    let delay = OsRng.gen_range(EPHEMERAL_DELAY_MS);
    tokio::time::sleep(Duration::from_millis(delay)).await;
    output
}
