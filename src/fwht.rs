//! Fast Walsh-Hadamard transform modulo 65535
//!
//! Used to evaluate the error locator polynomial during decode, both on the
//! erasure indicator vector and once at initialization to produce the
//! transformed logarithm table.

use crate::galois::{add_mod, sub_mod, GfElement};

/// In-place FWHT over `data[..m]` where `m` is a power of two.
///
/// Decimation in time, two layers unrolled per pass. `m_truncated` bounds the
/// inner row loops so callers can skip butterfly groups whose inputs are
/// known to be zero; the outer stride loop always covers the full `m`.
pub(crate) fn fwht(data: &mut [GfElement], m: usize, m_truncated: usize) {
    debug_assert!(m.is_power_of_two());
    debug_assert!(m_truncated <= m);

    let mut dist = 1;
    let mut dist4 = 4;
    while dist4 <= m {
        let mut r = 0;
        while r < m_truncated {
            for i in r..r + dist {
                let mut t0 = data[i];
                let mut t1 = data[i + dist];
                let mut t2 = data[i + dist * 2];
                let mut t3 = data[i + dist * 3];

                (t0, t1) = (add_mod(t0, t1), sub_mod(t0, t1));
                (t2, t3) = (add_mod(t2, t3), sub_mod(t2, t3));
                (t0, t2) = (add_mod(t0, t2), sub_mod(t0, t2));
                (t1, t3) = (add_mod(t1, t3), sub_mod(t1, t3));

                data[i] = t0;
                data[i + dist] = t1;
                data[i + dist * 2] = t2;
                data[i + dist * 3] = t3;
            }
            r += dist4;
        }
        dist = dist4;
        dist4 <<= 2;
    }

    // One layer left over when log2(m) is odd
    if dist < m {
        for i in 0..dist {
            let (a, b) = (data[i], data[i + dist]);
            data[i] = add_mod(a, b);
            data[i + dist] = sub_mod(a, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galois::GF_MODULUS;

    fn norm(x: GfElement) -> u32 {
        if x == GF_MODULUS {
            0
        } else {
            x as u32
        }
    }

    #[test]
    fn fwht_is_self_inverse_up_to_scale() {
        // Applying the transform twice multiplies every entry by m mod 65535
        for m in [4usize, 8, 16, 64, 256] {
            let mut data: Vec<GfElement> = (0..m as u32).map(|i| (i * 2531 % 65535) as u16).collect();
            let original = data.clone();

            fwht(&mut data, m, m);
            fwht(&mut data, m, m);

            for i in 0..m {
                let expected = norm(original[i]) * (m as u32 % 65535) % 65535;
                assert_eq!(norm(data[i]) % 65535, expected, "m = {}, i = {}", m, i);
            }
        }
    }

    #[test]
    fn fwht_single_leftover_layer() {
        // log2(8) is odd, exercising the trailing single-layer pass
        let mut data: Vec<GfElement> = vec![5, 9, 1, 0, 3, 3, 7, 65534];
        let original = data.clone();
        fwht(&mut data, 8, 8);
        fwht(&mut data, 8, 8);
        for i in 0..8 {
            assert_eq!(norm(data[i]), norm(original[i]) * 8 % 65535);
        }
    }

    #[test]
    fn truncation_ignores_zero_tail() {
        // With a zero tail, truncating the first layers must not change the result
        let m = 64;
        let live = 20;
        let mut full: Vec<GfElement> = (0..m).map(|i| if i < live { (i * 37 + 1) as u16 } else { 0 }).collect();
        let mut truncated = full.clone();

        fwht(&mut full, m, m);
        fwht(&mut truncated, m, live);

        assert_eq!(full, truncated);
    }
}
