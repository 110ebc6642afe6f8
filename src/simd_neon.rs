//! ARM NEON memory kernels
//!
//! Same nibble-lookup multiply as the AVX2 path but with 128-bit registers:
//! `vqtbl1q_u8` consumes the first 16-byte half of each shuffle row (the
//! rows are stored replicated for the 256-bit path), and each 64-byte block
//! is processed as two 16-element halves per plane.

#![cfg(target_arch = "aarch64")]

use std::arch::aarch64::*;

use crate::tables::Mul256;

/// `x[] ^= y[]` using 128-bit registers, four per iteration.
///
/// # Safety
/// - Requires NEON (present on all aarch64 CPUs).
/// - `x.len() == y.len()` and the length is a multiple of 64.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn xor_mem(x: &mut [u8], y: &[u8]) {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len() % 64, 0);

    let xp = x.as_mut_ptr();
    let yp = y.as_ptr();

    let mut pos = 0;
    while pos + 64 <= x.len() {
        let a0 = vld1q_u8(xp.add(pos));
        let a1 = vld1q_u8(xp.add(pos + 16));
        let a2 = vld1q_u8(xp.add(pos + 32));
        let a3 = vld1q_u8(xp.add(pos + 48));
        let b0 = vld1q_u8(yp.add(pos));
        let b1 = vld1q_u8(yp.add(pos + 16));
        let b2 = vld1q_u8(yp.add(pos + 32));
        let b3 = vld1q_u8(yp.add(pos + 48));
        vst1q_u8(xp.add(pos), veorq_u8(a0, b0));
        vst1q_u8(xp.add(pos + 16), veorq_u8(a1, b1));
        vst1q_u8(xp.add(pos + 32), veorq_u8(a2, b2));
        vst1q_u8(xp.add(pos + 48), veorq_u8(a3, b3));
        pos += 64;
    }
}

struct MulRegs {
    t0_lo: uint8x16_t,
    t1_lo: uint8x16_t,
    t2_lo: uint8x16_t,
    t3_lo: uint8x16_t,
    t0_hi: uint8x16_t,
    t1_hi: uint8x16_t,
    t2_hi: uint8x16_t,
    t3_hi: uint8x16_t,
    mask: uint8x16_t,
}

#[target_feature(enable = "neon")]
unsafe fn load_tables(lut: &Mul256) -> MulRegs {
    MulRegs {
        t0_lo: vld1q_u8(lut.lo[0].as_ptr()),
        t1_lo: vld1q_u8(lut.lo[1].as_ptr()),
        t2_lo: vld1q_u8(lut.lo[2].as_ptr()),
        t3_lo: vld1q_u8(lut.lo[3].as_ptr()),
        t0_hi: vld1q_u8(lut.hi[0].as_ptr()),
        t1_hi: vld1q_u8(lut.hi[1].as_ptr()),
        t2_hi: vld1q_u8(lut.hi[2].as_ptr()),
        t3_hi: vld1q_u8(lut.hi[3].as_ptr()),
        mask: vdupq_n_u8(0x0f),
    }
}

/// Product of 16 elements given their low-byte and high-byte vectors.
#[target_feature(enable = "neon")]
unsafe fn half_product(
    regs: &MulRegs,
    value_lo: uint8x16_t,
    value_hi: uint8x16_t,
) -> (uint8x16_t, uint8x16_t) {
    let data0 = vandq_u8(value_lo, regs.mask);
    let data1 = vshrq_n_u8(value_lo, 4);
    let data2 = vandq_u8(value_hi, regs.mask);
    let data3 = vshrq_n_u8(value_hi, 4);

    let mut prod_lo = veorq_u8(vqtbl1q_u8(regs.t0_lo, data0), vqtbl1q_u8(regs.t1_lo, data1));
    prod_lo = veorq_u8(prod_lo, vqtbl1q_u8(regs.t2_lo, data2));
    prod_lo = veorq_u8(prod_lo, vqtbl1q_u8(regs.t3_lo, data3));

    let mut prod_hi = veorq_u8(vqtbl1q_u8(regs.t0_hi, data0), vqtbl1q_u8(regs.t1_hi, data1));
    prod_hi = veorq_u8(prod_hi, vqtbl1q_u8(regs.t2_hi, data2));
    prod_hi = veorq_u8(prod_hi, vqtbl1q_u8(regs.t3_hi, data3));

    (prod_lo, prod_hi)
}

/// `x[] = y[] * m` over interleaved 64-byte blocks.
///
/// # Safety
/// - Requires NEON.
/// - `x.len() == y.len()`, length a multiple of 64, buffers disjoint.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn mul_mem(x: &mut [u8], y: &[u8], lut: &Mul256) {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len() % 64, 0);

    let regs = load_tables(lut);
    let xp = x.as_mut_ptr();
    let yp = y.as_ptr();

    let mut pos = 0;
    while pos + 64 <= x.len() {
        for half in [0usize, 16] {
            let value_lo = vld1q_u8(yp.add(pos + half));
            let value_hi = vld1q_u8(yp.add(pos + 32 + half));
            let (prod_lo, prod_hi) = half_product(&regs, value_lo, value_hi);
            vst1q_u8(xp.add(pos + half), prod_lo);
            vst1q_u8(xp.add(pos + 32 + half), prod_hi);
        }
        pos += 64;
    }
}

/// `x[] ^= y[] * m` over interleaved 64-byte blocks.
///
/// # Safety
/// Same requirements as [`mul_mem`].
#[target_feature(enable = "neon")]
pub(crate) unsafe fn muladd_mem(x: &mut [u8], y: &[u8], lut: &Mul256) {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len() % 64, 0);

    let regs = load_tables(lut);
    let xp = x.as_mut_ptr();
    let yp = y.as_ptr();

    let mut pos = 0;
    while pos + 64 <= x.len() {
        for half in [0usize, 16] {
            let value_lo = vld1q_u8(yp.add(pos + half));
            let value_hi = vld1q_u8(yp.add(pos + 32 + half));
            let (prod_lo, prod_hi) = half_product(&regs, value_lo, value_hi);
            let x_lo = vld1q_u8(xp.add(pos + half));
            let x_hi = vld1q_u8(xp.add(pos + 32 + half));
            vst1q_u8(xp.add(pos + half), veorq_u8(x_lo, prod_lo));
            vst1q_u8(xp.add(pos + 32 + half), veorq_u8(x_hi, prod_hi));
        }
        pos += 64;
    }
}
