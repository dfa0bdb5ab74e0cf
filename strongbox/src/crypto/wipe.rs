//! # Secret Wiping
//!
//! Best-effort erasure of secrets from memory. All writes go through the
//! `zeroize` crate (volatile stores plus a compiler fence), so the optimizer
//! can't drop them as dead stores.
//!
//! "Best effort" is doing a lot of work in that sentence. We can wipe the
//! buffer you hand us. We cannot wipe the copy your allocator left behind
//! when a `Vec` grew, the page the OS swapped out, or the `String` someone
//! cloned three call frames up. Treat this as hygiene, not a guarantee.
//!
//! For anything that holds key material across an `?`, prefer
//! [`SecretBytes`]: it wipes on drop, so every exit path is covered.

use zeroize::{DefaultIsZeroes, Zeroize, Zeroizing};

/// Owned byte buffer that zeroes itself on drop.
///
/// Used throughout the crate for exported private keys, derived KEKs and
/// shared secrets.
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Overwrite every byte with zero. Length is preserved.
pub fn wipe_bytes(buf: &mut [u8]) {
    buf.zeroize();
}

/// Overwrite every element of an integer (or other plain-old-data) slice
/// with its zero value. Length is preserved.
pub fn wipe_ints<T: DefaultIsZeroes>(buf: &mut [T]) {
    buf.zeroize();
}

/// Zero the bytes of every string, then leave each one empty.
///
/// The slice keeps its length; each element becomes `""`. The heap
/// allocations are scrubbed before their length is reset.
pub fn wipe_strings(buf: &mut [String]) {
    for s in buf.iter_mut() {
        s.zeroize();
    }
}

/// Wrap freshly produced key material so it is wiped on drop.
pub fn secret(bytes: Vec<u8>) -> SecretBytes {
    Zeroizing::new(bytes)
}
