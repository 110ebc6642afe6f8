//! Runtime SIMD feature detection and kernel dispatch
//!
//! CPU features are probed exactly once, during `init()`, and the winning
//! implementations are stored as a table of function pointers. Transform code
//! calls through the table without any per-call feature checks.

use std::sync::OnceLock;

use log::debug;

use crate::scalar;
use crate::tables::Mul256;

#[cfg(target_arch = "aarch64")]
use crate::simd_neon;
#[cfg(target_arch = "x86_64")]
use crate::simd_pshufb;

/// SIMD capability levels this crate can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdLevel {
    None,
    Neon,
    Avx2,
}

/// Runtime detection of CPU SIMD features
pub fn detect_simd_support() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("ssse3") {
            return SimdLevel::Avx2;
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            return SimdLevel::Neon;
        }
    }
    SimdLevel::None
}

/// The memory kernels chosen at `init()` time.
#[derive(Clone, Copy)]
pub(crate) struct Kernels {
    /// `x[] ^= y[]`
    pub xor_mem: fn(&mut [u8], &[u8]),
    /// `x[] = y[] * m`
    pub mul_mem: fn(&mut [u8], &[u8], &Mul256),
    /// `x[] ^= y[] * m`
    pub muladd_mem: fn(&mut [u8], &[u8], &Mul256),
}

static KERNELS: OnceLock<Kernels> = OnceLock::new();

/// Select kernels for the detected level if this is the first call.
pub(crate) fn initialize() -> &'static Kernels {
    KERNELS.get_or_init(|| {
        let level = detect_simd_support();
        debug!("selected kernel level {:?}", level);
        select_kernels(level)
    })
}

/// The selected kernels, or `None` before the first `init()`.
pub(crate) fn kernels() -> Option<&'static Kernels> {
    KERNELS.get()
}

fn select_kernels(level: SimdLevel) -> Kernels {
    match level {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => Kernels {
            xor_mem: avx2_xor_mem,
            mul_mem: avx2_mul_mem,
            muladd_mem: avx2_muladd_mem,
        },
        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => Kernels {
            xor_mem: neon_xor_mem,
            mul_mem: neon_mul_mem,
            muladd_mem: neon_muladd_mem,
        },
        _ => Kernels {
            xor_mem: scalar::xor_mem,
            mul_mem: scalar::mul_mem,
            muladd_mem: scalar::muladd_mem,
        },
    }
}

// Safe wrappers: these are only ever installed in the dispatch table after
// the matching feature detection succeeded.

#[cfg(target_arch = "x86_64")]
fn avx2_xor_mem(x: &mut [u8], y: &[u8]) {
    unsafe { simd_pshufb::xor_mem(x, y) }
}

#[cfg(target_arch = "x86_64")]
fn avx2_mul_mem(x: &mut [u8], y: &[u8], lut: &Mul256) {
    unsafe { simd_pshufb::mul_mem(x, y, lut) }
}

#[cfg(target_arch = "x86_64")]
fn avx2_muladd_mem(x: &mut [u8], y: &[u8], lut: &Mul256) {
    unsafe { simd_pshufb::muladd_mem(x, y, lut) }
}

#[cfg(target_arch = "aarch64")]
fn neon_xor_mem(x: &mut [u8], y: &[u8]) {
    unsafe { simd_neon::xor_mem(x, y) }
}

#[cfg(target_arch = "aarch64")]
fn neon_mul_mem(x: &mut [u8], y: &[u8], lut: &Mul256) {
    unsafe { simd_neon::mul_mem(x, y, lut) }
}

#[cfg(target_arch = "aarch64")]
fn neon_muladd_mem(x: &mut [u8], y: &[u8], lut: &Mul256) {
    unsafe { simd_neon::muladd_mem(x, y, lut) }
}
