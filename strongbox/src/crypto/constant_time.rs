//! # Constant-Time Comparison
//!
//! Comparing a MAC tag or a password hash with `==` is how timing oracles
//! are born: the slice comparison bails out at the first differing byte, and
//! an attacker with a stopwatch learns how many leading bytes they got right.
//!
//! The routines here never exit early on content. Runtime depends on the
//! lengths of the inputs and nothing else. Lengths are not secret in any
//! protocol we care about (a SHA-256 tag is 32 bytes, everyone knows that).
//!
//! The final "is the accumulator zero" check goes through `subtle` so the
//! compiler can't turn it back into a data-dependent branch.

use subtle::ConstantTimeEq;

/// Compare two byte sequences without short-circuiting on content.
///
/// The scan always runs over every byte of `a`. If `b` has a different
/// length it is indexed cyclically, so every position of `a` is still
/// touched, and the length mismatch itself is folded into the difference
/// marker. Only after the full scan is the marker compared with zero.
///
/// Two empty inputs are equal. An empty input never equals a non-empty one.
///
/// # Example
///
/// ```
/// use strongbox::crypto::ct_eq;
///
/// assert!(ct_eq(b"tag", b"tag"));
/// assert!(!ct_eq(b"tag", b"tab"));
/// assert!(!ct_eq(b"tag", b"tags"));
/// ```
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    // Lengths are public, branching on them leaks nothing new.
    if a.is_empty() || b.is_empty() {
        return a.len() == b.len();
    }

    let mut marker = fold_usize(a.len() ^ b.len());
    for (i, x) in a.iter().enumerate() {
        marker |= x ^ b[i % b.len()];
    }

    bool::from(core::hint::black_box(marker).ct_eq(&0))
}

/// Compare two fixed-size arrays in constant time.
///
/// Use this for digests, tags and raw keys where the length is part of the
/// type.
pub fn ct_eq_array<const N: usize>(a: &[u8; N], b: &[u8; N]) -> bool {
    bool::from(a[..].ct_eq(&b[..]))
}

/// Check whether every byte is zero, without exiting early.
///
/// Handy for rejecting all-zero DH outputs (small-order peer keys).
pub fn ct_is_zero(data: &[u8]) -> bool {
    let marker = data.iter().fold(0u8, |acc, b| acc | b);
    bool::from(core::hint::black_box(marker).ct_eq(&0))
}

/// Collapse a `usize` into a single byte marker that is non-zero iff the
/// input is non-zero.
fn fold_usize(value: usize) -> u8 {
    value.to_le_bytes().iter().fold(0u8, |acc, b| acc | b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_slices() {
        assert!(ct_eq(b"hello world", b"hello world"));
    }

    #[test]
    fn test_single_byte_difference_anywhere() {
        // Flip every position in turn. The early-exit bug this module exists
        // to prevent would still get these right, but a broken accumulator
        // (e.g. `=` instead of `|=`) would not.
        let base = [0x5Au8; 64];
        for i in 0..base.len() {
            let mut other = base;
            other[i] ^= 0x01;
            assert!(!ct_eq(&base, &other), "difference at {i} not detected");
        }
    }

    #[test]
    fn test_unequal_lengths() {
        assert!(!ct_eq(b"abc", b"abcd"));
        assert!(!ct_eq(b"abcd", b"abc"));
        // Cyclic indexing of "ab" over "abab" matches byte-for-byte, so the
        // length marker is the only thing that catches this one.
        assert!(!ct_eq(b"abab", b"ab"));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(ct_eq(b"", b""));
        assert!(!ct_eq(b"", b"a"));
        assert!(!ct_eq(b"a", b""));
    }

    #[test]
    fn test_ct_eq_array() {
        let a = [7u8; 32];
        let mut b = [7u8; 32];
        assert!(ct_eq_array(&a, &b));
        b[31] = 8;
        assert!(!ct_eq_array(&a, &b));
    }

    #[test]
    fn test_ct_is_zero() {
        assert!(ct_is_zero(&[0u8; 32]));
        assert!(ct_is_zero(&[]));
        let mut buf = [0u8; 32];
        buf[17] = 1;
        assert!(!ct_is_zero(&buf));
    }

    #[test]
    fn test_fold_usize() {
        assert_eq!(fold_usize(0), 0);
        assert_ne!(fold_usize(1), 0);
        assert_ne!(fold_usize(1 << 40), 0);
    }

    #[test]
    fn test_agrees_with_slice_equality() {
        // Cheap exhaustive-ish check against the obviously-correct (and
        // obviously-leaky) comparison.
        let samples: [&[u8]; 6] = [b"", b"a", b"b", b"ab", b"ba", b"abc"];
        for x in samples {
            for y in samples {
                assert_eq!(ct_eq(x, y), x == y, "{x:?} vs {y:?}");
            }
        }
    }
}
