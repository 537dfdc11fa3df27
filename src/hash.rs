//! 32-bit Murmur3 scramble (seed 0) used to place keys into buckets.
//!
//! Blocks are always read little-endian so bucket placement is identical on
//! every target.

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline]
fn scramble(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Hash `data` with 32-bit Murmur3 and a zero seed.
pub fn murmur3_32(data: &[u8]) -> u32 {
    let mut h: u32 = 0;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= scramble(k);
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    // The tail is mixed in without the rotate/multiply-add step.
    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k: u32 = 0;
        if tail.len() == 3 {
            k ^= u32::from(tail[2]) << 16;
        }
        if tail.len() >= 2 {
            k ^= u32::from(tail[1]) << 8;
        }
        k ^= u32::from(tail[0]);
        h ^= scramble(k);
    }

    // Length is folded in modulo 2^32, matching a 32-bit state.
    h ^= data.len() as u32;
    fmix32(h)
}

/// Bucket for `key` in a table of `slots` buckets.
///
/// `slots` must be non-zero; the table never holds an empty bucket array.
#[inline]
pub fn bucket_index(key: &[u8], slots: usize) -> usize {
    debug_assert!(slots > 0, "bucket array must not be empty");
    murmur3_32(key) as usize % slots
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the empty input hashes to zero (state, length and mix are all zero).
    #[test]
    fn empty_input_is_zero() {
        assert_eq!(murmur3_32(b""), 0);
    }

    /// Invariant: published Murmur3_x86_32 vectors with seed 0 are reproduced.
    #[test]
    fn known_vectors() {
        assert_eq!(murmur3_32(b"test"), 0xba6b_d213);
        assert_eq!(
            murmur3_32(b"The quick brown fox jumps over the lazy dog"),
            0x2e4f_f723
        );
    }

    /// Invariant: each tail length (0..=3) contributes to the hash, so keys
    /// sharing a block prefix but differing in the tail do not collide here.
    #[test]
    fn tail_bytes_are_mixed() {
        let inputs: [&[u8]; 4] = [b"abcd", b"abcde", b"abcdef", b"abcdefg"];
        let hashes: Vec<u32> = inputs.iter().map(|k| murmur3_32(k)).collect();
        for i in 0..hashes.len() {
            for j in (i + 1)..hashes.len() {
                assert_ne!(hashes[i], hashes[j], "{:?} vs {:?}", inputs[i], inputs[j]);
            }
        }
    }

    /// Invariant: length participates in the hash; trailing zero bytes change it.
    #[test]
    fn length_is_mixed() {
        assert_ne!(murmur3_32(b"\0"), murmur3_32(b""));
        assert_ne!(murmur3_32(b"a\0"), murmur3_32(b"a"));
    }

    /// Invariant: identical bytes hash identically across calls and buffers.
    #[test]
    fn deterministic_across_buffers() {
        let a = b"same-key".to_vec();
        let b: Vec<u8> = "same-key".bytes().collect();
        assert_eq!(murmur3_32(&a), murmur3_32(&b));
        assert_eq!(bucket_index(&a, 97), bucket_index(&b, 97));
    }

    /// Invariant: bucket index is always within `[0, slots)`.
    #[test]
    fn bucket_index_in_range() {
        for slots in [1usize, 2, 3, 7, 8, 1024] {
            for i in 0u32..256 {
                let key = i.to_le_bytes();
                assert!(bucket_index(&key, slots) < slots);
            }
        }
    }
}
