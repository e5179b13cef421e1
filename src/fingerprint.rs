//! 32-bit key fingerprint.
//!
//! Keys are folded eight bytes at a time into a 64-bit accumulator, the
//! trailing bytes are folded together with the low byte of the length,
//! and the accumulator is collapsed to 32 bits. The output is stable
//! across platforms and releases: slot placement and tests depend on it.

const SEED: u64 = 2166136261;
const BLOCK_MULTIPLIER: u64 = 0xbf58_476d_1ce4_e5b9;
const TAIL_MULTIPLIER: u64 = 0xd6e8_feb8_6659_fd93;

#[inline]
fn read_le(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// Fingerprint of an arbitrary byte slice, including the empty one.
pub fn fingerprint(bytes: &[u8]) -> u32 {
    let mut acc = SEED;

    let mut blocks = bytes.chunks_exact(8);
    for block in &mut blocks {
        acc ^= read_le(block);
        acc = acc.wrapping_mul(BLOCK_MULTIPLIER);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        // Tail byte i lands one byte above its position; byte 0 holds the length.
        let last = (bytes.len() as u64 & 0xff) | (read_le(tail) << 8);
        acc ^= last;
        acc = acc.wrapping_mul(TAIL_MULTIPLIER);
    }

    (acc ^ (acc >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use super::fingerprint;

    /// Invariant: output is pinned bit-for-bit for known inputs.
    #[test]
    fn known_vectors() {
        let cases: &[(&[u8], u32)] = &[
            (b"", 0x811c_9dc5),
            (b"a", 0x6d49_cc01),
            (b"hello", 0xadfe_36ce),
            (b"world", 0x85da_efbe),
            (b"abcdefgh", 0x4bcf_9133),
            (b"abcdefghi", 0x744c_c1af),
            (b"The quick brown fox", 0x38ad_22f5),
        ];
        for &(input, expected) in cases {
            assert_eq!(
                fingerprint(input),
                expected,
                "fingerprint({:?})",
                String::from_utf8_lossy(input)
            );
        }
    }

    /// Invariant: the empty key skips both folding steps.
    #[test]
    fn empty_is_seed() {
        assert_eq!(fingerprint(&[]), 2166136261u32);
    }

    /// Invariant: identical bytes hash identically regardless of where they live.
    #[test]
    fn independent_of_storage() {
        let owned: Vec<u8> = b"some key bytes".to_vec();
        let boxed: Box<[u8]> = owned.clone().into_boxed_slice();
        let mut padded = vec![0u8; 3];
        padded.extend_from_slice(&owned);
        assert_eq!(fingerprint(&owned), fingerprint(&boxed));
        assert_eq!(fingerprint(&owned), fingerprint(&padded[3..]));
    }

    /// Invariant: the length byte is mixed in, so a trailing zero byte matters.
    #[test]
    fn trailing_zero_changes_fingerprint() {
        assert_ne!(fingerprint(b"a"), fingerprint(b"a\0"));
        assert_ne!(fingerprint(b"abcdefgh"), fingerprint(b"abcdefgh\0"));
    }
}
