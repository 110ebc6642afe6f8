//! End-to-end encode/recover/decode round trips
//!
//! Chunks carry a trailing md5 digest of their payload so reconstruction can
//! be verified without keeping reference copies of every share.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Random payload with its md5 digest in the last 16 bytes.
fn checked_rand_bytes(rng: &mut StdRng, bytes: usize) -> Vec<u8> {
    assert!(bytes > 16);
    let mut chunk = vec![0u8; bytes];
    let payload_len = bytes - 16;
    rng.fill_bytes(&mut chunk[..payload_len]);
    let digest = md5::compute(&chunk[..payload_len]);
    chunk[payload_len..].copy_from_slice(&digest.0);
    chunk
}

/// True when the trailing digest still matches the payload.
fn check_bytes(chunk: &[u8]) -> bool {
    let (payload, digest) = chunk.split_at(chunk.len() - 16);
    md5::compute(payload).0 == *digest
}

fn random_originals(rng: &mut StdRng, count: usize, bytes: usize) -> Vec<Option<Vec<u8>>> {
    (0..count)
        .map(|_| Some(checked_rand_bytes(rng, bytes)))
        .collect()
}

#[test]
fn encode_returns_one_share_per_original() {
    leors::init().unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let originals = random_originals(&mut rng, 64, 640);
    let recovery = leors::encode(&originals).unwrap();

    assert_eq!(recovery.len(), 64);
    for share in &recovery {
        assert_eq!(share.len(), 640);
    }
}

#[test]
fn full_original_loss_round_trips() {
    leors::init().unwrap();
    let mut rng = StdRng::seed_from_u64(2);

    let original_count = 1024;
    let originals = random_originals(&mut rng, original_count, 6400);
    let recovery: Vec<Option<Vec<u8>>> = leors::encode(&originals)
        .unwrap()
        .into_iter()
        .map(Some)
        .collect();

    // Lose every original
    let lost: Vec<Option<Vec<u8>>> = vec![None; original_count];
    let restored = leors::recover(&lost, &recovery).unwrap();

    assert_eq!(restored.len(), leors::decode_work_count(original_count, original_count));
    for i in 0..original_count {
        assert!(check_bytes(&restored[i]), "share {} corrupt", i);
        assert_eq!(restored[i], *originals[i].as_ref().unwrap());
    }
}

#[test]
fn mixed_loss_round_trips() {
    leors::init().unwrap();
    let mut rng = StdRng::seed_from_u64(3);

    let original_count = 1024;
    let originals = random_originals(&mut rng, original_count, 6400);
    let encoded = leors::encode(&originals).unwrap();

    // Drop the first half of the originals and a few recovery shares
    let mut damaged = originals.clone();
    for slot in damaged[..512].iter_mut() {
        *slot = None;
    }
    let mut recovery: Vec<Option<Vec<u8>>> = encoded.iter().cloned().map(Some).collect();
    for idx in [5usize, 10, 23] {
        recovery[idx] = None;
    }

    let restored = leors::decode(&damaged, &recovery).unwrap();

    for i in 0..512 {
        assert_eq!(
            restored[i],
            *originals[i].as_ref().unwrap(),
            "original {} not reconstructed",
            i,
        );
    }
    // The fuller recovery also reveals the lost recovery shares
    for idx in [5usize, 10, 23] {
        assert_eq!(
            restored[original_count + idx],
            encoded[idx],
            "recovery {} not reconstructed",
            idx,
        );
    }
}

#[test]
fn uniform_loss_at_field_scale_round_trips() {
    leors::init().unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let original_count = 32768;
    let originals = random_originals(&mut rng, original_count, 640);
    let encoded = leors::encode(&originals).unwrap();

    // Lose exactly original_count of the 2 * original_count shares
    let mut damaged = originals.clone();
    let mut recovery: Vec<Option<Vec<u8>>> = encoded.into_iter().map(Some).collect();
    let mut lost = 0;
    while lost < original_count {
        let idx = rng.gen_range(0..2 * original_count);
        let slot = if idx < original_count {
            &mut damaged[idx]
        } else {
            &mut recovery[idx - original_count]
        };
        if slot.is_some() {
            *slot = None;
            lost += 1;
        }
    }

    let restored = leors::recover(&damaged, &recovery).unwrap();
    for i in 0..original_count {
        if damaged[i].is_none() {
            assert!(check_bytes(&restored[i]), "share {} corrupt", i);
            assert_eq!(restored[i], *originals[i].as_ref().unwrap());
        }
    }
}

#[test]
fn non_power_of_two_counts_round_trip() {
    leors::init().unwrap();
    let mut rng = StdRng::seed_from_u64(4);

    for original_count in [2usize, 3, 5, 7, 100, 129] {
        let originals = random_originals(&mut rng, original_count, 64 + 16 * 4);
        let encoded = leors::encode(&originals).unwrap();
        assert_eq!(encoded.len(), original_count);

        // Lose as many shares as the code can tolerate, spread over both halves
        let mut damaged = originals.clone();
        let mut recovery: Vec<Option<Vec<u8>>> = encoded.iter().cloned().map(Some).collect();
        for i in 0..original_count {
            if i % 2 == 0 {
                damaged[i] = None;
            } else {
                recovery[i] = None;
            }
        }

        let restored = leors::decode(&damaged, &recovery).unwrap();
        for i in 0..original_count {
            assert_eq!(
                restored[i],
                *originals[i].as_ref().unwrap(),
                "k = {}, original {}",
                original_count,
                i,
            );
            assert_eq!(
                restored[original_count + i],
                encoded[i],
                "k = {}, recovery {}",
                original_count,
                i,
            );
        }
    }
}

#[test]
fn present_inputs_win_over_reconstruction() {
    leors::init().unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    let originals = random_originals(&mut rng, 16, 128);
    let encoded = leors::encode(&originals).unwrap();

    let mut damaged = originals.clone();
    damaged[7] = None;
    let recovery: Vec<Option<Vec<u8>>> = encoded.iter().cloned().map(Some).collect();

    let restored = leors::decode(&damaged, &recovery).unwrap();
    for (i, chunk) in originals.iter().enumerate() {
        if i != 7 {
            assert_eq!(restored[i], *chunk.as_ref().unwrap());
        }
    }
    for (j, share) in encoded.iter().enumerate() {
        assert_eq!(restored[16 + j], *share);
    }
}

#[test]
fn identical_inputs_produce_identical_outputs() {
    leors::init().unwrap();
    let mut rng = StdRng::seed_from_u64(6);

    let originals = random_originals(&mut rng, 32, 192);
    let first = leors::encode(&originals).unwrap();
    let second = leors::encode(&originals).unwrap();
    assert_eq!(first, second);

    let mut damaged = originals.clone();
    damaged[0] = None;
    damaged[31] = None;
    let recovery: Vec<Option<Vec<u8>>> = first.into_iter().map(Some).collect();
    let a = leors::decode(&damaged, &recovery).unwrap();
    let b = leors::decode(&damaged, &recovery).unwrap();
    assert_eq!(a, b);
}

#[test]
fn absent_originals_encode_as_zero() {
    leors::init().unwrap();

    let mut data: Vec<Option<Vec<u8>>> = vec![Some(vec![0u8; 64]); 4];
    data[2] = None;
    let with_absent = leors::encode(&data).unwrap();

    data[2] = Some(vec![0u8; 64]);
    let with_zero = leors::encode(&data).unwrap();

    assert_eq!(with_absent, with_zero);
}
