//! # Digital Signatures
//!
//! Generic signing helpers over any [`AsymmetricAlgorithm`] that signs.
//!
//! ## Hash-then-sign
//!
//! [`sign_hashed`] digests the message with a caller-chosen
//! [`HashAlgorithm`] and signs the digest, not the message. That's what
//! you want when the message is a 4 GB file and only its hash travels, or
//! when a peer insists on "SHA-512, then sign". Both sides must agree on
//! the hash algorithm; we don't put it in the signature.
//!
//! The backend still applies its own internal hashing on top (RSA and
//! ECDSA hash with SHA-256, Ed25519 with SHA-512). That's fine. It's just
//! a signature over a short message that happens to be a digest.

use tracing::trace;

use super::asymmetric::{AsymmetricAlgorithm, AsymmetricError, KeyPair, PublicKey};
use super::hash::HashAlgorithm;

/// Sign `message` with `pair`.
///
/// # Example
///
/// ```
/// use strongbox::crypto::asymmetric::{Ed25519, KeyPair};
/// use strongbox::crypto::signatures::{sign, verify};
///
/// let pair = KeyPair::<Ed25519>::generate().unwrap();
/// let sig = sign(&pair, b"send 100 coins to alice").unwrap();
/// assert!(verify(&pair.public_key(), b"send 100 coins to alice", &sig).unwrap());
/// ```
pub fn sign<A: AsymmetricAlgorithm>(
    pair: &KeyPair<A>,
    message: &[u8],
) -> Result<Vec<u8>, AsymmetricError> {
    pair.sign(message)
}

/// Verify `signature` over `message`.
///
/// `Ok(false)` means "nope", without saying whether the key, the message or
/// the signature was the wrong one. `Err` means the algorithm can't verify
/// at all.
pub fn verify<A: AsymmetricAlgorithm>(
    public: &PublicKey<A>,
    message: &[u8],
    signature: &[u8],
) -> Result<bool, AsymmetricError> {
    public.verify(message, signature)
}

/// Hash `message` with `hash`, then sign the digest.
pub fn sign_hashed<A: AsymmetricAlgorithm>(
    hash: HashAlgorithm,
    pair: &KeyPair<A>,
    message: &[u8],
) -> Result<Vec<u8>, AsymmetricError> {
    let digest = hash.compute(message);
    trace!(algorithm = A::NAME, %hash, "signing digest");
    pair.sign(&digest)
}

/// Counterpart of [`sign_hashed`]. Must use the same `hash`.
pub fn verify_hashed<A: AsymmetricAlgorithm>(
    hash: HashAlgorithm,
    public: &PublicKey<A>,
    message: &[u8],
    signature: &[u8],
) -> Result<bool, AsymmetricError> {
    public.verify(&hash.compute(message), signature)
}

/// Batch-verify multiple signatures.
///
/// All signatures must be valid for this to return `Ok`. If any single
/// signature fails, the entire batch fails and we don't tell you which
/// one. If you need to know, verify them individually.
///
/// Sequential under the hood; none of the backends we wrap expose a
/// generic batch API.
pub fn batch_verify<A: AsymmetricAlgorithm>(
    items: &[(PublicKey<A>, Vec<u8>, Vec<u8>)],
) -> Result<(), AsymmetricError> {
    for (public, message, signature) in items {
        if !public.verify(message, signature)? {
            return Err(AsymmetricError::VerificationFailed);
        }
    }
    Ok(())
}
