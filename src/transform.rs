//! Decimation-in-time additive FFT, IFFT and supporting vector operations
//!
//! Transforms operate on a mutable set of equally sized chunks. Butterfly
//! multipliers ("skews") come from the global skew table, consulted at the
//! absolute evaluation position of each butterfly minus one; `skew_delta`
//! shifts a transform block to its absolute position in the evaluation grid.
//! A skew equal to `GF_MODULUS` marks a multiply-by-zero and only the XOR
//! half of the butterfly runs.
//!
//! The outer loops unroll two layers at a time, handling four chunks per
//! group; a final single-layer pass covers transforms whose log2 size is odd.

use rayon::prelude::*;

use crate::error::{LeoError, Result};
use crate::galois::{GfElement, GF_MODULUS};
use crate::simd::{self, Kernels};
use crate::tables::{self, Tables};

/// Shared handle on the global tables and the dispatched kernels.
///
/// Obtained per operation; fails when `init()` has not completed yet.
#[derive(Clone, Copy)]
pub(crate) struct Engine {
    pub tables: &'static Tables,
    pub kernels: &'static Kernels,
}

impl Engine {
    pub(crate) fn get() -> Result<Self> {
        let tables = tables::get().ok_or(LeoError::CallInitialize)?;
        let kernels = simd::kernels().ok_or(LeoError::CallInitialize)?;
        Ok(Engine { tables, kernels })
    }
}

/// Disjoint mutable borrows of `work[i]` and `work[j]` for `i < j`.
fn pair_mut(work: &mut [Vec<u8>], i: usize, j: usize) -> (&mut [u8], &mut [u8]) {
    debug_assert!(i < j);
    let (head, tail) = work.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

impl Engine {
    /// IFFT butterfly: `y ^= x`, then `x ^= y * m` unless the skew is zero.
    fn ifft_butterfly_2(&self, work: &mut [Vec<u8>], i: usize, j: usize, log_m: GfElement) {
        let (x, y) = pair_mut(work, i, j);
        (self.kernels.xor_mem)(y, x);
        if log_m != GF_MODULUS {
            (self.kernels.muladd_mem)(x, y, &self.tables.mul[log_m as usize]);
        }
    }

    /// FFT butterfly: `x ^= y * m` unless the skew is zero, then `y ^= x`.
    fn fft_butterfly_2(&self, work: &mut [Vec<u8>], i: usize, j: usize, log_m: GfElement) {
        let (x, y) = pair_mut(work, i, j);
        if log_m != GF_MODULUS {
            (self.kernels.muladd_mem)(x, y, &self.tables.mul[log_m as usize]);
        }
        (self.kernels.xor_mem)(y, x);
    }

    /// Two unrolled IFFT layers over the four chunks at stride `dist`.
    fn ifft_butterfly_4(
        &self,
        work: &mut [Vec<u8>],
        i: usize,
        dist: usize,
        log_m01: GfElement,
        log_m23: GfElement,
        log_m02: GfElement,
    ) {
        self.ifft_butterfly_2(work, i, i + dist, log_m01);
        self.ifft_butterfly_2(work, i + dist * 2, i + dist * 3, log_m23);
        self.ifft_butterfly_2(work, i, i + dist * 2, log_m02);
        self.ifft_butterfly_2(work, i + dist, i + dist * 3, log_m02);
    }

    /// Two unrolled FFT layers, mirror order of [`Self::ifft_butterfly_4`].
    fn fft_butterfly_4(
        &self,
        work: &mut [Vec<u8>],
        i: usize,
        dist: usize,
        log_m01: GfElement,
        log_m23: GfElement,
        log_m02: GfElement,
    ) {
        self.fft_butterfly_2(work, i, i + dist * 2, log_m02);
        self.fft_butterfly_2(work, i + dist, i + dist * 3, log_m02);
        self.fft_butterfly_2(work, i, i + dist, log_m01);
        self.fft_butterfly_2(work, i + dist * 2, i + dist * 3, log_m23);
    }

    /// In-place decimation-in-time IFFT of `work[..m]`.
    ///
    /// `m_truncated` bounds the butterfly groups so known-zero suffixes are
    /// skipped; `skew_delta` is the absolute position of `work[0]` in the
    /// evaluation grid.
    pub(crate) fn ifft_dit(
        &self,
        work: &mut [Vec<u8>],
        m_truncated: usize,
        m: usize,
        skew_delta: usize,
    ) {
        debug_assert!(m.is_power_of_two());
        debug_assert!(m_truncated <= m);

        let skew = &self.tables.skew;
        let mut dist = 1;
        let mut dist4 = 4;
        while dist4 <= m {
            let mut r = 0;
            while r < m_truncated {
                let base = r + dist + skew_delta - 1;
                let log_m01 = skew[base];
                let log_m02 = skew[base + dist];
                let log_m23 = skew[base + dist * 2];
                for i in r..r + dist {
                    self.ifft_butterfly_4(work, i, dist, log_m01, log_m23, log_m02);
                }
                r += dist4;
            }
            dist = dist4;
            dist4 <<= 2;
        }

        // One layer left over when log2(m) is odd
        if dist < m {
            let log_m = skew[dist + skew_delta - 1];
            if log_m == GF_MODULUS {
                let (x, y) = work.split_at_mut(dist);
                self.vector_xor(&mut y[..dist], &x[..dist]);
            } else {
                for i in 0..dist {
                    self.ifft_butterfly_2(work, i, i + dist, log_m);
                }
            }
        }
    }

    /// [`Self::ifft_dit`] preceded by the data load: `data` is copied into
    /// `work[..len]`, absent entries and the `[len, m)` tail are zeroed.
    pub(crate) fn ifft_dit_encoder(
        &self,
        data: &[Option<Vec<u8>>],
        work: &mut [Vec<u8>],
        m: usize,
        skew_delta: usize,
    ) {
        let len = data.len();
        debug_assert!(len <= m);

        for (slot, chunk) in work[..len].iter_mut().zip(data) {
            match chunk {
                Some(bytes) => slot.copy_from_slice(bytes),
                None => slot.fill(0),
            }
        }
        for slot in work[len..m].iter_mut() {
            slot.fill(0);
        }

        self.ifft_dit(work, len, m, skew_delta);
    }

    /// In-place decimation-in-time FFT of `work[..m]`, truncated like
    /// [`Self::ifft_dit`].
    pub(crate) fn fft_dit(
        &self,
        work: &mut [Vec<u8>],
        m_truncated: usize,
        m: usize,
        skew_delta: usize,
    ) {
        debug_assert!(m.is_power_of_two());
        debug_assert!(m_truncated <= m);

        let skew = &self.tables.skew;
        let mut dist4 = m;
        let mut dist = m >> 2;
        while dist != 0 {
            let mut r = 0;
            while r < m_truncated {
                let base = r + dist + skew_delta - 1;
                let log_m01 = skew[base];
                let log_m02 = skew[base + dist];
                let log_m23 = skew[base + dist * 2];
                for i in r..r + dist {
                    self.fft_butterfly_4(work, i, dist, log_m01, log_m23, log_m02);
                }
                r += dist4;
            }
            dist4 = dist;
            dist >>= 2;
        }

        if dist4 == 2 {
            let mut r = 0;
            while r < m_truncated {
                let log_m = skew[r + skew_delta];
                if log_m == GF_MODULUS {
                    let (x, y) = pair_mut(work, r, r + 1);
                    (self.kernels.xor_mem)(y, x);
                } else {
                    self.fft_butterfly_2(work, r, r + 1, log_m);
                }
                r += 2;
            }
        }
    }

    /// `x[i] ^= y[i]` across whole chunk arrays.
    ///
    /// Chunks are independent, so wide calls fan out across the thread pool;
    /// narrow ones are not worth the scheduling overhead.
    pub(crate) fn vector_xor(&self, x: &mut [Vec<u8>], y: &[Vec<u8>]) {
        debug_assert_eq!(x.len(), y.len());
        let xor = self.kernels.xor_mem;
        if x.len() < 32 {
            for (xc, yc) in x.iter_mut().zip(y) {
                xor(xc, yc);
            }
        } else {
            x.par_iter_mut()
                .zip(y.par_iter())
                .for_each(|(xc, yc)| xor(xc, yc));
        }
    }

    /// Formal derivative in the additive-FFT basis.
    ///
    /// `((i ^ (i - 1)) + 1) >> 1` extracts the lowest-set-bit group size of
    /// each index and drives a variable-stride XOR.
    pub(crate) fn formal_derivative(&self, work: &mut [Vec<u8>]) {
        for i in 1..work.len() {
            let width = ((i ^ (i - 1)) + 1) >> 1;
            let (x, y) = work.split_at_mut(i);
            let start = i - width;
            self.vector_xor(&mut x[start..], &y[..width]);
        }
    }
}
