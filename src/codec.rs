//! Reed-Solomon encode and erasure-recovery transforms
//!
//! The encoder treats the original chunks as evaluations of a polynomial at
//! positions `[m, m + k)` of the additive-FFT grid, where
//! `m = next_pow2(recovery_count)`: an IFFT per m-sized block of data
//! accumulates the polynomial, and a final FFT at positions `[0, m)`
//! evaluates the recovery shares.
//!
//! The decoder is the Lin-Chung-Han erasure decoder: scale the surviving
//! shares by the error locator polynomial (evaluated with two Walsh
//! transforms), IFFT, take the formal derivative, FFT, and unscale at the
//! erased positions.

use log::debug;
use rayon::prelude::*;

use crate::fwht::fwht;
use crate::galois::{GfElement, GF_MODULUS, GF_ORDER};
use crate::transform::Engine;

/// Next power of two at or above `n`, with `next_pow2(1) == 1`.
pub(crate) fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Number of work chunks `encode` needs for `k` originals and `r` recovery
/// shares.
pub fn encode_work_count(original_count: usize, recovery_count: usize) -> usize {
    if original_count == 1 {
        recovery_count
    } else if recovery_count == 1 {
        1
    } else {
        2 * next_pow2(recovery_count)
    }
}

/// Number of work chunks `recover` needs for `k` originals and `r` recovery
/// shares.
pub fn decode_work_count(original_count: usize, recovery_count: usize) -> usize {
    if original_count == 1 || recovery_count == 1 {
        original_count
    } else {
        next_pow2(next_pow2(recovery_count) + original_count)
    }
}

pub(crate) fn alloc_chunks(count: usize, buffer_bytes: usize) -> Vec<Vec<u8>> {
    (0..count).map(|_| vec![0u8; buffer_bytes]).collect()
}

/// Compute recovery shares into `work`.
///
/// `work` must hold `encode_work_count(k, r)` zeroed chunks; on return the
/// first `recovery_count` entries are the recovery shares. In the general
/// case the upper half of `work` only serves as scratch for the block loop
/// and stays zero whenever `original_count <= next_pow2(recovery_count)`.
pub(crate) fn reed_solomon_encode(
    engine: &Engine,
    data: &[Option<Vec<u8>>],
    recovery_count: usize,
    work: &mut [Vec<u8>],
) {
    let original_count = data.len();
    debug!(
        "encode: {} original, {} recovery, {} byte chunks",
        original_count,
        recovery_count,
        work.first().map_or(0, Vec::len),
    );

    // One original: the polynomial is constant, every share is a copy of it
    if original_count == 1 {
        for slot in work[..recovery_count].iter_mut() {
            match &data[0] {
                Some(bytes) => slot.copy_from_slice(bytes),
                None => slot.fill(0),
            }
        }
        return;
    }

    // One recovery share: plain parity
    if recovery_count == 1 {
        work[0].fill(0);
        for bytes in data.iter().flatten() {
            (engine.kernels.xor_mem)(&mut work[0], bytes);
        }
        return;
    }

    let m = next_pow2(recovery_count);
    let (acc, temp) = work.split_at_mut(m);

    // The data block at absolute position m
    let first = original_count.min(m);
    engine.ifft_dit_encoder(&data[..first], acc, m, m);

    // Remaining m-sized blocks accumulate into the first IFFT
    let mut block = 1;
    while block * m < original_count {
        let start = block * m;
        let end = (start + m).min(original_count);
        engine.ifft_dit_encoder(&data[start..end], temp, m, (block + 1) * m);
        engine.vector_xor(acc, temp);
        block += 1;
    }

    // Evaluate the recovery positions; shares beyond recovery_count are
    // never read, so the FFT is truncated there
    engine.fft_dit(acc, recovery_count, m, 0);
}

/// Recover every absent share.
///
/// Returns `decode_work_count(k, r)` chunks laid out as
/// `[originals | recovery | zero padding]`; present inputs are copied
/// through, absent ones are reconstructed.
pub(crate) fn reed_solomon_decode(
    engine: &Engine,
    original: &[Option<Vec<u8>>],
    recovery: &[Option<Vec<u8>>],
    buffer_bytes: usize,
) -> Vec<Vec<u8>> {
    let original_count = original.len();
    let recovery_count = recovery.len();
    let m = next_pow2(recovery_count);
    let n_total = decode_work_count(original_count, recovery_count);
    debug!(
        "decode: {} original, {} recovery, m = {}, {} work chunks",
        original_count, recovery_count, m, n_total,
    );

    // Erasure indicator over the full field order: lost recovery shares,
    // padding positions up to m, then lost originals at [m, m + k)
    let mut err_locs = vec![0u16; GF_ORDER];
    for (e, chunk) in err_locs.iter_mut().zip(recovery) {
        if chunk.is_none() {
            *e = 1;
        }
    }
    for e in err_locs[recovery_count..m].iter_mut() {
        *e = 1;
    }
    for (e, chunk) in err_locs[m..].iter_mut().zip(original) {
        if chunk.is_none() {
            *e = 1;
        }
    }

    evaluate_error_locator(&mut err_locs, m + original_count, engine);

    // Load the surviving shares scaled by the locator evaluations
    let mut work = alloc_chunks(n_total, buffer_bytes);
    let mul = engine.kernels.mul_mem;
    let tables = engine.tables;
    work[..recovery_count]
        .par_iter_mut()
        .zip(recovery.par_iter())
        .zip(err_locs[..recovery_count].par_iter())
        .for_each(|((slot, chunk), &log_m)| {
            if let Some(bytes) = chunk {
                mul(slot, bytes, &tables.mul[log_m as usize]);
            }
        });
    work[m..m + original_count]
        .par_iter_mut()
        .zip(original.par_iter())
        .zip(err_locs[m..m + original_count].par_iter())
        .for_each(|((slot, chunk), &log_m)| {
            if let Some(bytes) = chunk {
                mul(slot, bytes, &tables.mul[log_m as usize]);
            }
        });

    engine.ifft_dit(&mut work, m + original_count, n_total, 0);
    engine.formal_derivative(&mut work);
    engine.fft_dit(&mut work, m + original_count, n_total, 0);

    // Reveal erasures into a fresh output set: recovered originals come from
    // positions [m, m + k), recovered recovery shares from [0, r), each
    // unscaled by the locator evaluation at its own position
    let mut out = alloc_chunks(n_total, buffer_bytes);
    let reveal = |slot: &mut Vec<u8>, chunk: &Option<Vec<u8>>, source: &Vec<u8>, log_m: GfElement| {
        match chunk {
            Some(bytes) => slot.copy_from_slice(bytes),
            None => mul(slot, source, &tables.mul[(GF_MODULUS - log_m) as usize]),
        }
    };
    for (i, chunk) in original.iter().enumerate() {
        reveal(&mut out[i], chunk, &work[m + i], err_locs[m + i]);
    }
    for (j, chunk) in recovery.iter().enumerate() {
        reveal(&mut out[original_count + j], chunk, &work[j], err_locs[j]);
    }
    out
}

/// Evaluate the error locator polynomial over the whole field:
/// FWHT, pointwise multiply with the transformed log table, FWHT again.
fn evaluate_error_locator(err_locs: &mut [GfElement], truncated: usize, engine: &Engine) {
    fwht(err_locs, GF_ORDER, truncated);

    let log_walsh = &engine.tables.log_walsh;
    for (e, &lw) in err_locs.iter_mut().zip(log_walsh) {
        *e = ((*e as u32 * lw as u32) % GF_MODULUS as u32) as GfElement;
    }

    fwht(err_locs, GF_ORDER, GF_ORDER);
}
