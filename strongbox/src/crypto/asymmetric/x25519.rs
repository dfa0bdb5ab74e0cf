//! # X25519
//!
//! Diffie-Hellman on Curve25519 via `x25519-dalek`. Keys have no standard
//! DER form in that crate, so the native export format is simply the raw
//! 32 bytes for both halves.
//!
//! A low-order peer key makes the shared secret all zeros. We refuse that
//! instead of handing the caller a "secret" every attacker already knows.

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroize;

use super::{AsymmetricAlgorithm, AsymmetricError, Capabilities};
use crate::config::X25519_KEY_LENGTH;
use crate::crypto::constant_time::ct_is_zero;
use crate::crypto::wipe::{secret, SecretBytes};

/// X25519 key agreement.
#[derive(Debug, Clone, Copy)]
pub struct X25519;

fn to_array(bytes: &[u8]) -> Option<[u8; X25519_KEY_LENGTH]> {
    bytes.try_into().ok()
}

impl AsymmetricAlgorithm for X25519 {
    const NAME: &'static str = "X25519";

    const CAPABILITIES: Capabilities = Capabilities {
        encryption: false,
        signatures: false,
        key_agreement: true,
        raw_public_key: true,
    };

    type PrivateKey = StaticSecret;
    type PublicKey = X25519PublicKey;

    fn generate() -> Result<StaticSecret, AsymmetricError> {
        Ok(StaticSecret::random_from_rng(OsRng))
    }

    fn public_key(private: &StaticSecret) -> X25519PublicKey {
        X25519PublicKey::from(private)
    }

    fn export_private(private: &StaticSecret) -> Result<SecretBytes, AsymmetricError> {
        let mut bytes = private.to_bytes();
        let out = secret(bytes.to_vec());
        bytes.zeroize();
        Ok(out)
    }

    fn import_private(bytes: &[u8]) -> Result<StaticSecret, AsymmetricError> {
        let mut arr = to_array(bytes).ok_or(AsymmetricError::InvalidPrivateKey)?;
        let key = StaticSecret::from(arr);
        arr.zeroize();
        Ok(key)
    }

    fn export_public(public: &X25519PublicKey) -> Result<Vec<u8>, AsymmetricError> {
        Ok(public.as_bytes().to_vec())
    }

    fn import_public(bytes: &[u8]) -> Result<X25519PublicKey, AsymmetricError> {
        let arr = to_array(bytes).ok_or(AsymmetricError::InvalidPublicKey)?;
        Ok(X25519PublicKey::from(arr))
    }

    fn export_public_raw(public: &X25519PublicKey) -> Result<Vec<u8>, AsymmetricError> {
        Self::export_public(public)
    }

    fn import_public_raw(bytes: &[u8]) -> Result<X25519PublicKey, AsymmetricError> {
        Self::import_public(bytes)
    }

    fn derive_shared_secret(
        private: &StaticSecret,
        remote: &X25519PublicKey,
    ) -> Result<SecretBytes, AsymmetricError> {
        let shared = private.diffie_hellman(remote);
        if ct_is_zero(shared.as_bytes()) {
            return Err(AsymmetricError::AgreementFailed);
        }
        Ok(secret(shared.as_bytes().to_vec()))
    }
}
