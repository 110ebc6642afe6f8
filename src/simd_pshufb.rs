//! AVX2 byte-shuffle memory kernels for x86_64
//!
//! Implements the "Screaming Fast Galois Field Arithmetic" technique
//! (Plank et al., FAST 2013): a 16-bit multiply becomes eight 16-entry
//! nibble lookups done with `vpshufb`, four producing the low product plane
//! and four the high plane. The 32-byte rows in [`Mul256`] are already
//! replicated across both 128-bit lanes, so each row loads straight into a
//! 256-bit register.
//!
//! A 64-byte block holds the low bytes of 32 elements followed by their high
//! bytes, which is exactly one 256-bit register per plane.

#![cfg(target_arch = "x86_64")]

use std::arch::x86_64::*;

use crate::tables::Mul256;

/// `x[] ^= y[]` using 256-bit registers, four per iteration.
///
/// # Safety
/// - Caller must ensure the CPU supports AVX2.
/// - `x.len() == y.len()` and the length is a multiple of 64.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn xor_mem(x: &mut [u8], y: &[u8]) {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len() % 64, 0);

    let xp = x.as_mut_ptr();
    let yp = y.as_ptr();
    let len = x.len();

    let mut pos = 0;
    while pos + 128 <= len {
        let a0 = _mm256_loadu_si256(xp.add(pos) as *const __m256i);
        let a1 = _mm256_loadu_si256(xp.add(pos + 32) as *const __m256i);
        let a2 = _mm256_loadu_si256(xp.add(pos + 64) as *const __m256i);
        let a3 = _mm256_loadu_si256(xp.add(pos + 96) as *const __m256i);
        let b0 = _mm256_loadu_si256(yp.add(pos) as *const __m256i);
        let b1 = _mm256_loadu_si256(yp.add(pos + 32) as *const __m256i);
        let b2 = _mm256_loadu_si256(yp.add(pos + 64) as *const __m256i);
        let b3 = _mm256_loadu_si256(yp.add(pos + 96) as *const __m256i);
        _mm256_storeu_si256(xp.add(pos) as *mut __m256i, _mm256_xor_si256(a0, b0));
        _mm256_storeu_si256(xp.add(pos + 32) as *mut __m256i, _mm256_xor_si256(a1, b1));
        _mm256_storeu_si256(xp.add(pos + 64) as *mut __m256i, _mm256_xor_si256(a2, b2));
        _mm256_storeu_si256(xp.add(pos + 96) as *mut __m256i, _mm256_xor_si256(a3, b3));
        pos += 128;
    }
    while pos + 32 <= len {
        let a = _mm256_loadu_si256(xp.add(pos) as *const __m256i);
        let b = _mm256_loadu_si256(yp.add(pos) as *const __m256i);
        _mm256_storeu_si256(xp.add(pos) as *mut __m256i, _mm256_xor_si256(a, b));
        pos += 32;
    }
}

struct MulRegs {
    t0_lo: __m256i,
    t1_lo: __m256i,
    t2_lo: __m256i,
    t3_lo: __m256i,
    t0_hi: __m256i,
    t1_hi: __m256i,
    t2_hi: __m256i,
    t3_hi: __m256i,
    clr_mask: __m256i,
}

#[target_feature(enable = "avx2")]
unsafe fn load_tables(lut: &Mul256) -> MulRegs {
    MulRegs {
        t0_lo: _mm256_loadu_si256(lut.lo[0].as_ptr() as *const __m256i),
        t1_lo: _mm256_loadu_si256(lut.lo[1].as_ptr() as *const __m256i),
        t2_lo: _mm256_loadu_si256(lut.lo[2].as_ptr() as *const __m256i),
        t3_lo: _mm256_loadu_si256(lut.lo[3].as_ptr() as *const __m256i),
        t0_hi: _mm256_loadu_si256(lut.hi[0].as_ptr() as *const __m256i),
        t1_hi: _mm256_loadu_si256(lut.hi[1].as_ptr() as *const __m256i),
        t2_hi: _mm256_loadu_si256(lut.hi[2].as_ptr() as *const __m256i),
        t3_hi: _mm256_loadu_si256(lut.hi[3].as_ptr() as *const __m256i),
        clr_mask: _mm256_set1_epi8(0x0f),
    }
}

/// Shuffle one 64-byte block (32 elements) through the eight nibble rows.
#[target_feature(enable = "avx2", enable = "ssse3")]
unsafe fn block_product(regs: &MulRegs, value_lo: __m256i, value_hi: __m256i) -> (__m256i, __m256i) {
    let data0 = _mm256_and_si256(value_lo, regs.clr_mask);
    let data1 = _mm256_and_si256(_mm256_srli_epi64(value_lo, 4), regs.clr_mask);
    let data2 = _mm256_and_si256(value_hi, regs.clr_mask);
    let data3 = _mm256_and_si256(_mm256_srli_epi64(value_hi, 4), regs.clr_mask);

    let mut prod_lo = _mm256_shuffle_epi8(regs.t0_lo, data0);
    let mut prod_hi = _mm256_shuffle_epi8(regs.t0_hi, data0);
    prod_lo = _mm256_xor_si256(prod_lo, _mm256_shuffle_epi8(regs.t1_lo, data1));
    prod_hi = _mm256_xor_si256(prod_hi, _mm256_shuffle_epi8(regs.t1_hi, data1));
    prod_lo = _mm256_xor_si256(prod_lo, _mm256_shuffle_epi8(regs.t2_lo, data2));
    prod_hi = _mm256_xor_si256(prod_hi, _mm256_shuffle_epi8(regs.t2_hi, data2));
    prod_lo = _mm256_xor_si256(prod_lo, _mm256_shuffle_epi8(regs.t3_lo, data3));
    prod_hi = _mm256_xor_si256(prod_hi, _mm256_shuffle_epi8(regs.t3_hi, data3));

    (prod_lo, prod_hi)
}

/// `x[] = y[] * m` over interleaved 64-byte blocks.
///
/// # Safety
/// - Caller must ensure the CPU supports AVX2 and SSSE3.
/// - `x.len() == y.len()`, length a multiple of 64, buffers disjoint.
#[target_feature(enable = "avx2", enable = "ssse3")]
pub(crate) unsafe fn mul_mem(x: &mut [u8], y: &[u8], lut: &Mul256) {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len() % 64, 0);

    let regs = load_tables(lut);
    let xp = x.as_mut_ptr();
    let yp = y.as_ptr();

    let mut pos = 0;
    while pos + 64 <= x.len() {
        let value_lo = _mm256_loadu_si256(yp.add(pos) as *const __m256i);
        let value_hi = _mm256_loadu_si256(yp.add(pos + 32) as *const __m256i);
        let (prod_lo, prod_hi) = block_product(&regs, value_lo, value_hi);
        _mm256_storeu_si256(xp.add(pos) as *mut __m256i, prod_lo);
        _mm256_storeu_si256(xp.add(pos + 32) as *mut __m256i, prod_hi);
        pos += 64;
    }
}

/// `x[] ^= y[] * m` over interleaved 64-byte blocks.
///
/// # Safety
/// Same requirements as [`mul_mem`].
#[target_feature(enable = "avx2", enable = "ssse3")]
pub(crate) unsafe fn muladd_mem(x: &mut [u8], y: &[u8], lut: &Mul256) {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len() % 64, 0);

    let regs = load_tables(lut);
    let xp = x.as_mut_ptr();
    let yp = y.as_ptr();

    let mut pos = 0;
    while pos + 64 <= x.len() {
        let value_lo = _mm256_loadu_si256(yp.add(pos) as *const __m256i);
        let value_hi = _mm256_loadu_si256(yp.add(pos + 32) as *const __m256i);
        let (prod_lo, prod_hi) = block_product(&regs, value_lo, value_hi);
        let x_lo = _mm256_loadu_si256(xp.add(pos) as *const __m256i);
        let x_hi = _mm256_loadu_si256(xp.add(pos + 32) as *const __m256i);
        _mm256_storeu_si256(xp.add(pos) as *mut __m256i, _mm256_xor_si256(x_lo, prod_lo));
        _mm256_storeu_si256(
            xp.add(pos + 32) as *mut __m256i,
            _mm256_xor_si256(x_hi, prod_hi),
        );
        pos += 64;
    }
}
