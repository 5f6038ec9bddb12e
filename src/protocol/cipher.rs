use super::types::{CIPHER_STATE, DecryptedFrame, FRAME_SIZE, KEY, RawFrame, SHUFFLE_MAP};

/// Reverse the sensor's byte obfuscation.
///
/// Total over all inputs: a garbage frame decrypts to garbage, and it is up to
/// [`validate`](super::validate) to reject it. All arithmetic wraps modulo 256.
///
/// # Panics
///
/// If `shuffle` is not a permutation of `0..8`. [`SHUFFLE_MAP`] is.
pub fn decrypt(
    raw: &RawFrame,
    key: &[u8; FRAME_SIZE],
    cipher_state: &[u8; FRAME_SIZE],
    shuffle: &[usize; FRAME_SIZE],
) -> DecryptedFrame {
    assert_permutation(shuffle);
    let mut phase1 = [0u8; FRAME_SIZE];
    for (i, &dst) in shuffle.iter().enumerate() {
        phase1[dst] = raw[i];
    }

    let mut phase2 = [0u8; FRAME_SIZE];
    for i in 0..FRAME_SIZE {
        phase2[i] = phase1[i] ^ key[i];
    }

    // Right-rotate the whole 64-bit sequence by 3: each byte takes its top
    // 3 bits from the low bits of the previous byte.
    let mut phase3 = [0u8; FRAME_SIZE];
    for i in 0..FRAME_SIZE {
        let prev = phase2[(i + FRAME_SIZE - 1) % FRAME_SIZE];
        phase3[i] = (phase2[i] >> 3) | (prev << 5);
    }

    let mut out = [0u8; FRAME_SIZE];
    for i in 0..FRAME_SIZE {
        out[i] = phase3[i].wrapping_sub(swap_nibbles(cipher_state[i]));
    }
    out
}

/// [`decrypt`] with the sensor's fixed key, cipher state and shuffle map.
pub fn decrypt_frame(raw: &RawFrame) -> DecryptedFrame {
    decrypt(raw, &KEY, &CIPHER_STATE, &SHUFFLE_MAP)
}

/// Exact inverse of [`decrypt`]. Produces the bytes the sensor would put on
/// the wire for a given decrypted frame; used to build device fixtures.
///
/// # Panics
///
/// If `shuffle` is not a permutation of `0..8`.
pub fn encrypt(
    frame: &DecryptedFrame,
    key: &[u8; FRAME_SIZE],
    cipher_state: &[u8; FRAME_SIZE],
    shuffle: &[usize; FRAME_SIZE],
) -> RawFrame {
    let mut phase3 = [0u8; FRAME_SIZE];
    for i in 0..FRAME_SIZE {
        phase3[i] = frame[i].wrapping_add(swap_nibbles(cipher_state[i]));
    }

    let phase2 = u64::from_be_bytes(phase3).rotate_left(3).to_be_bytes();

    let mut phase1 = [0u8; FRAME_SIZE];
    for i in 0..FRAME_SIZE {
        phase1[i] = phase2[i] ^ key[i];
    }

    assert_permutation(shuffle);
    let mut raw = [0u8; FRAME_SIZE];
    for (i, &src) in shuffle.iter().enumerate() {
        raw[i] = phase1[src];
    }
    raw
}

/// [`encrypt`] with the sensor's fixed key, cipher state and shuffle map.
pub fn encrypt_frame(frame: &DecryptedFrame) -> RawFrame {
    encrypt(frame, &KEY, &CIPHER_STATE, &SHUFFLE_MAP)
}

fn assert_permutation(shuffle: &[usize; FRAME_SIZE]) {
    let mut seen = [false; FRAME_SIZE];
    for &pos in shuffle {
        assert!(
            pos < FRAME_SIZE && !seen[pos],
            "shuffle map {shuffle:?} is not a permutation of 0..{FRAME_SIZE}"
        );
        seen[pos] = true;
    }
}

#[inline]
fn swap_nibbles(b: u8) -> u8 {
    b.rotate_left(4)
}
