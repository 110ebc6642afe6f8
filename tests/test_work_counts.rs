//! Work-count sizing helpers against their closed forms

use leors::{decode_work_count, encode_work_count};

#[test]
fn encode_work_count_table() {
    let cases = [
        // (original, recovery, expected)
        (1, 1, 1),
        (1, 2, 2),
        (1, 255, 255),
        (255, 1, 1),
        (5, 2, 4),
        (5, 4, 8),
        (5, 5, 16),
        (5, 6, 16),
        (5, 7, 16),
        (5, 8, 16),
        (5, 9, 32),
    ];
    for (original, recovery, expected) in cases {
        assert_eq!(
            encode_work_count(original, recovery),
            expected,
            "encode_work_count({}, {})",
            original,
            recovery,
        );
    }
}

#[test]
fn encode_work_count_closed_form() {
    fn next_pow2(n: usize) -> usize {
        n.max(1).next_power_of_two()
    }

    for k in 1..=1024 {
        assert_eq!(encode_work_count(1, k), k);
        assert_eq!(encode_work_count(k, 1), 1);
    }
    for k in 2..=1024 {
        for r in 2..=1024 {
            assert_eq!(encode_work_count(k, r), 2 * next_pow2(r), "({}, {})", k, r);
        }
    }
}

#[test]
fn decode_work_count_closed_form() {
    fn next_pow2(n: usize) -> usize {
        n.max(1).next_power_of_two()
    }

    for k in 1..=1024 {
        assert_eq!(decode_work_count(1, k), 1);
        assert_eq!(decode_work_count(k, 1), k);
    }
    for k in 2..=1024 {
        for r in 2..=1024 {
            assert_eq!(
                decode_work_count(k, r),
                next_pow2(next_pow2(r) + k),
                "({}, {})",
                k,
                r,
            );
        }
    }
    // The usual r == k shape doubles the padded original count
    assert_eq!(decode_work_count(1024, 1024), 2048);
    assert_eq!(decode_work_count(32768, 32768), 65536);
}
