//! One-shot global lookup tables
//!
//! Everything the transforms need at runtime is precomputed here exactly once
//! per process and shared behind a `OnceLock`: the Cantor-basis log/exp pair,
//! the per-multiplier nibble shuffle tables consumed by the memory kernels,
//! the additive-FFT skew factors, and the Walsh-transformed logarithm table
//! used to evaluate error locator polynomials.
//!
//! Combined the tables are a few megabytes, which is why they are process
//! globals rather than per-instance state.

use std::sync::OnceLock;

use log::debug;
use rayon::prelude::*;

use crate::fwht::fwht;
use crate::galois::{add_mod, build_exp_log, mul_log, GfElement, GF_BITS, GF_MODULUS, GF_ORDER};

/// Shuffle tables for one pre-logged multiplier.
///
/// Four 32-byte rows per output plane, one row per input nibble position.
/// Each row holds a 16-entry lookup replicated into both 16-byte halves so a
/// 256-bit byte shuffle can consume it directly; scalar and 128-bit kernels
/// read only the first half.
#[derive(Clone)]
pub struct Mul256 {
    /// Rows producing the low byte of each product
    pub lo: [[u8; 32]; 4],
    /// Rows producing the high byte of each product
    pub hi: [[u8; 32]; 4],
}

/// The full immutable table set built by `init()`.
pub struct Tables {
    /// Logarithm table in the Cantor-basis representation
    pub log: Vec<GfElement>,
    /// Inverse of `log`; `exp[GF_MODULUS] == exp[0]`
    pub exp: Vec<GfElement>,
    /// Shuffle tables indexed by multiplier logarithm
    pub mul: Vec<Mul256>,
    /// Additive-FFT skew factors, stored as logarithms
    pub skew: Vec<GfElement>,
    /// FWHT of the logarithm table, `log_walsh[0]` forced to zero first
    pub log_walsh: Vec<GfElement>,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

/// Build the tables if this is the first call, then return them.
pub(crate) fn initialize() -> &'static Tables {
    TABLES.get_or_init(Tables::build)
}

/// The tables, or `None` before the first `init()`.
pub(crate) fn get() -> Option<&'static Tables> {
    TABLES.get()
}

impl Tables {
    fn build() -> Self {
        let (log, exp) = build_exp_log();
        debug!("exp/log tables ready");

        let mul = build_mul_tables(&log, &exp);
        debug!("multiply shuffle tables ready");

        let skew = build_skew(&log, &exp);
        let log_walsh = build_log_walsh(&log);
        debug!("fft skew and log-walsh tables ready");

        Tables {
            log,
            exp,
            mul,
            skew,
            log_walsh,
        }
    }
}

/// Nibble shuffle tables for every possible multiplier logarithm.
fn build_mul_tables(log: &[GfElement], exp: &[GfElement]) -> Vec<Mul256> {
    (0..GF_ORDER as u32)
        .into_par_iter()
        .map(|log_m| {
            let mut t = Mul256 {
                lo: [[0u8; 32]; 4],
                hi: [[0u8; 32]; 4],
            };
            for (row, shift) in (0..4).map(|r| (r, r * 4)) {
                for x in 0..16u16 {
                    let prod = mul_log(x << shift, log_m as GfElement, log, exp);
                    let x = x as usize;
                    t.lo[row][x] = prod as u8;
                    t.lo[row][x + 16] = prod as u8;
                    t.hi[row][x] = (prod >> 8) as u8;
                    t.hi[row][x + 16] = (prod >> 8) as u8;
                }
            }
            t
        })
        .collect()
}

/// Skew factors for the decimation-in-time additive FFT.
///
/// The Lin-Chung-Han recurrence writes raw field elements first; the final
/// pass converts every entry to its logarithm, turning zero skews into the
/// `GF_MODULUS` sentinel the butterflies branch on. The table is consulted at
/// `absolute_butterfly_position - 1`.
fn build_skew(log: &[GfElement], exp: &[GfElement]) -> Vec<GfElement> {
    let mut skew = vec![0u16; GF_ORDER];
    let mut temp = [0u16; GF_BITS - 1];

    for (i, t) in temp.iter_mut().enumerate() {
        *t = 1 << (i + 1);
    }

    for m in 0..GF_BITS - 1 {
        let step = 1usize << (m + 1);
        skew[(1usize << m) - 1] = 0;

        for i in m..GF_BITS - 1 {
            let s = 1usize << (i + 1);
            let mut j = (1usize << m) - 1;
            while j < s {
                skew[j + s] = skew[j] ^ temp[i];
                j += step;
            }
        }

        let t = mul_log(temp[m], log[(temp[m] ^ 1) as usize], log, exp);
        temp[m] = GF_MODULUS - log[t as usize];

        for i in m + 1..GF_BITS - 1 {
            let sum = add_mod(log[(temp[i] ^ 1) as usize], temp[m]);
            temp[i] = mul_log(temp[i], sum, log, exp);
        }
    }

    for entry in skew.iter_mut() {
        *entry = log[*entry as usize];
    }

    skew
}

/// FWHT of the logarithm table, used in the decode error locator evaluation.
fn build_log_walsh(log: &[GfElement]) -> Vec<GfElement> {
    let mut log_walsh = log.to_vec();
    log_walsh[0] = 0;
    fwht(&mut log_walsh, GF_ORDER, GF_ORDER);
    log_walsh
}
