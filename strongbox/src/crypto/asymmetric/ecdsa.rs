//! # ECDSA over P-256
//!
//! ECDSA with SHA-256 on P-256 (a.k.a. ES256). Signatures are the fixed
//! 64-byte `r || s` form, not DER. `p256` signs deterministically (RFC
//! 6979), so the same key and message always give the same signature and
//! a broken RNG can't leak the key the way it did for a certain games
//! console.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand::rngs::OsRng;

use super::{AsymmetricAlgorithm, AsymmetricError, Capabilities};
use crate::crypto::wipe::{secret, SecretBytes};

/// ECDSA-SHA256 on P-256. Signatures only.
#[derive(Debug, Clone, Copy)]
pub struct EcdsaP256;

impl AsymmetricAlgorithm for EcdsaP256 {
    const NAME: &'static str = "ECDSA-P256";

    const CAPABILITIES: Capabilities = Capabilities {
        encryption: false,
        signatures: true,
        key_agreement: false,
        raw_public_key: true,
    };

    type PrivateKey = SigningKey;
    type PublicKey = VerifyingKey;

    fn generate() -> Result<SigningKey, AsymmetricError> {
        Ok(SigningKey::random(&mut OsRng))
    }

    fn public_key(private: &SigningKey) -> VerifyingKey {
        VerifyingKey::from(private)
    }

    fn export_private(private: &SigningKey) -> Result<SecretBytes, AsymmetricError> {
        let doc = private
            .to_pkcs8_der()
            .map_err(|_| AsymmetricError::ExportFailed)?;
        Ok(secret(doc.as_bytes().to_vec()))
    }

    fn import_private(bytes: &[u8]) -> Result<SigningKey, AsymmetricError> {
        SigningKey::from_pkcs8_der(bytes).map_err(|_| AsymmetricError::InvalidPrivateKey)
    }

    fn export_public(public: &VerifyingKey) -> Result<Vec<u8>, AsymmetricError> {
        let doc = public
            .to_public_key_der()
            .map_err(|_| AsymmetricError::ExportFailed)?;
        Ok(doc.as_bytes().to_vec())
    }

    fn import_public(bytes: &[u8]) -> Result<VerifyingKey, AsymmetricError> {
        VerifyingKey::from_public_key_der(bytes).map_err(|_| AsymmetricError::InvalidPublicKey)
    }

    fn export_public_raw(public: &VerifyingKey) -> Result<Vec<u8>, AsymmetricError> {
        Ok(public.to_encoded_point(false).as_bytes().to_vec())
    }

    fn import_public_raw(bytes: &[u8]) -> Result<VerifyingKey, AsymmetricError> {
        VerifyingKey::from_sec1_bytes(bytes).map_err(|_| AsymmetricError::InvalidPublicKey)
    }

    fn sign(private: &SigningKey, message: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        let signature: Signature = private
            .try_sign(message)
            .map_err(|_| AsymmetricError::SignFailed)?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(
        public: &VerifyingKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, AsymmetricError> {
        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };
        Ok(public.verify(message, &signature).is_ok())
    }
}
