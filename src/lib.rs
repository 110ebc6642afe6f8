//! O(n log n) Reed-Solomon erasure coding over GF(2^16)
//!
//! This crate implements the Lin-Chung-Han additive-FFT construction: given
//! `k` equally sized original chunks it produces `k` recovery chunks such
//! that any `k` of the `2k` shares suffice to reconstruct the rest.
//!
//! ## Usage
//!
//! ```no_run
//! # fn main() -> Result<(), leors::LeoError> {
//! let originals: Vec<Option<Vec<u8>>> =
//!     (0..4).map(|i| Some(vec![i as u8; 64])).collect();
//!
//! leors::init()?;
//! let recovery = leors::encode(&originals)?;
//!
//! // Lose some shares, then hand the survivors back:
//! let mut damaged = originals.clone();
//! damaged[0] = None;
//! damaged[3] = None;
//! let received: Vec<Option<Vec<u8>>> = recovery.into_iter().map(Some).collect();
//! let restored = leors::decode(&damaged, &received)?;
//! assert_eq!(restored[0], vec![0u8; 64]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Chunk contract
//!
//! A chunk slot is either absent (`None`, meaning lost or not provided) or a
//! byte buffer whose length is a positive multiple of 64; all present chunks
//! in one call must share a single length.
//!
//! ## Concurrency
//!
//! `init()` must complete before the first transform; it is idempotent and
//! may be raced from several threads. Afterwards all tables are immutable, so
//! `encode`/`recover`/`decode` may run concurrently on disjoint buffers.

pub mod codec;
pub mod error;
pub mod galois;
pub mod simd;
pub mod tables;

mod fwht;
mod scalar;
mod transform;

#[cfg(target_arch = "aarch64")]
mod simd_neon;
#[cfg(target_arch = "x86_64")]
mod simd_pshufb;

use log::debug;

use crate::codec::{alloc_chunks, reed_solomon_decode, reed_solomon_encode};
use crate::galois::GF_ORDER;
use crate::transform::Engine;

pub use crate::codec::{decode_work_count, encode_work_count};
pub use crate::error::{LeoError, Result};
pub use crate::simd::{detect_simd_support, SimdLevel};

/// ABI version of the algorithm family this crate implements.
pub const VERSION: u32 = 2;

/// One-time initialization of the global tables and kernel dispatch.
///
/// Idempotent; later calls return immediately. Transforms invoked before the
/// first successful `init` fail with [`LeoError::CallInitialize`].
pub fn init() -> Result<()> {
    tables::initialize();
    simd::initialize();
    debug!("initialized (version {})", VERSION);
    Ok(())
}

/// Compute one recovery chunk per original chunk.
///
/// Absent slots are treated as all-zero originals. Returns exactly
/// `data.len()` recovery chunks.
pub fn encode(data: &[Option<Vec<u8>>]) -> Result<Vec<Vec<u8>>> {
    let engine = Engine::get()?;

    let original_count = data.len();
    if original_count == 0 {
        return Err(LeoError::InvalidInput);
    }
    let recovery_count = original_count;
    if original_count + recovery_count > GF_ORDER {
        return Err(LeoError::InvalidCounts);
    }
    if codec::next_pow2(recovery_count) + original_count > GF_ORDER {
        return Err(LeoError::TooMuchData);
    }
    let buffer_bytes = extract_buffer_bytes([data])?;

    let mut work = alloc_chunks(
        encode_work_count(original_count, recovery_count),
        buffer_bytes,
    );
    reed_solomon_encode(&engine, data, recovery_count, &mut work);
    work.truncate(recovery_count);
    Ok(work)
}

/// Reconstruct absent shares from the survivors.
///
/// `original` and `recovery` must have the same length `k`. The result holds
/// [`decode_work_count`]`(k, k)` chunks: positions `[0, k)` are the original
/// shares and `[k, 2k)` the recovery shares, each either copied from a
/// present input or reconstructed; any tail is zero filler.
pub fn recover(
    original: &[Option<Vec<u8>>],
    recovery: &[Option<Vec<u8>>],
) -> Result<Vec<Vec<u8>>> {
    let engine = Engine::get()?;

    if original.len() != recovery.len() || original.is_empty() {
        return Err(LeoError::InvalidInput);
    }
    let original_count = original.len();
    let recovery_count = recovery.len();
    if original_count + recovery_count > GF_ORDER {
        return Err(LeoError::InvalidCounts);
    }
    if decode_work_count(original_count, recovery_count) > GF_ORDER {
        return Err(LeoError::TooMuchData);
    }
    let buffer_bytes = extract_buffer_bytes([original, recovery])?;

    let missing_original = original.iter().filter(|c| c.is_none()).count();
    let present_recovery = recovery.iter().filter(|c| c.is_some()).count();
    if missing_original > present_recovery {
        return Err(LeoError::NeedMoreData);
    }

    // A single share pair degenerates to copying whichever side survived
    if original_count == 1 {
        let source = original[0].as_ref().or(recovery[0].as_ref());
        return match source {
            Some(bytes) => Ok(vec![bytes.clone()]),
            None => Err(LeoError::AllBuffersEmpty),
        };
    }

    if missing_original == 0 && recovery.iter().all(|c| c.is_some()) {
        // Nothing to reconstruct; assemble the output directly
        let n_total = decode_work_count(original_count, recovery_count);
        let mut out = alloc_chunks(n_total, buffer_bytes);
        for (slot, chunk) in out.iter_mut().zip(original.iter().chain(recovery)) {
            if let Some(bytes) = chunk {
                slot.copy_from_slice(bytes);
            }
        }
        return Ok(out);
    }

    Ok(reed_solomon_decode(&engine, original, recovery, buffer_bytes))
}

/// [`recover`], then overlay the caller's present chunks on the result.
///
/// Present inputs always win over reconstructions, so a present chunk is
/// returned bit-identical even if the transform would reproduce it
/// differently.
pub fn decode(
    original: &[Option<Vec<u8>>],
    recovery: &[Option<Vec<u8>>],
) -> Result<Vec<Vec<u8>>> {
    let mut out = recover(original, recovery)?;

    for (slot, chunk) in out.iter_mut().zip(original.iter().chain(recovery)) {
        if let Some(bytes) = chunk {
            slot.copy_from_slice(bytes);
        }
    }
    Ok(out)
}

/// Derive the shared buffer size from every present chunk across the given
/// chunk sets: all present chunks must agree, the size must be a positive
/// multiple of 64, and at least one chunk must be present.
fn extract_buffer_bytes<'a, const N: usize>(sets: [&'a [Option<Vec<u8>>]; N]) -> Result<usize> {
    let mut buffer_bytes = None;
    for chunk in sets.iter().flat_map(|s| s.iter()).flatten() {
        match buffer_bytes {
            None => buffer_bytes = Some(chunk.len()),
            Some(bytes) if bytes != chunk.len() => return Err(LeoError::InvalidSize),
            Some(_) => {}
        }
    }
    let buffer_bytes = buffer_bytes.ok_or(LeoError::AllBuffersEmpty)?;
    if buffer_bytes == 0 || buffer_bytes % 64 != 0 {
        return Err(LeoError::InvalidSize);
    }
    Ok(buffer_bytes)
}
