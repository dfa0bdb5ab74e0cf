//! # ECDH over P-256
//!
//! Static-static Diffie-Hellman on NIST P-256 via the `p256` crate. The
//! output is the x-coordinate of the shared point, 32 bytes, which is
//! *not* uniformly random and must go through a KDF. That's what
//! [`AgreementParameters`](crate::crypto::agreement::AgreementParameters)
//! is for.
//!
//! Point validation happens on import: `p256` refuses anything not on the
//! curve, and the identity point can't be represented by `PublicKey` at
//! all, so invalid-curve attacks stop at the front door.

use p256::ecdh::diffie_hellman;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey as P256PublicKey, SecretKey};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand::rngs::OsRng;

use super::{AsymmetricAlgorithm, AsymmetricError, Capabilities};
use crate::crypto::wipe::{secret, SecretBytes};

/// ECDH on P-256. Key agreement only.
#[derive(Debug, Clone, Copy)]
pub struct EcdhP256;

impl AsymmetricAlgorithm for EcdhP256 {
    const NAME: &'static str = "ECDH-P256";

    const CAPABILITIES: Capabilities = Capabilities {
        encryption: false,
        signatures: false,
        key_agreement: true,
        raw_public_key: true,
    };

    type PrivateKey = SecretKey;
    type PublicKey = P256PublicKey;

    fn generate() -> Result<SecretKey, AsymmetricError> {
        Ok(SecretKey::random(&mut OsRng))
    }

    fn public_key(private: &SecretKey) -> P256PublicKey {
        private.public_key()
    }

    fn export_private(private: &SecretKey) -> Result<SecretBytes, AsymmetricError> {
        let doc = private
            .to_pkcs8_der()
            .map_err(|_| AsymmetricError::ExportFailed)?;
        Ok(secret(doc.as_bytes().to_vec()))
    }

    fn import_private(bytes: &[u8]) -> Result<SecretKey, AsymmetricError> {
        SecretKey::from_pkcs8_der(bytes).map_err(|_| AsymmetricError::InvalidPrivateKey)
    }

    fn export_public(public: &P256PublicKey) -> Result<Vec<u8>, AsymmetricError> {
        let doc = public
            .to_public_key_der()
            .map_err(|_| AsymmetricError::ExportFailed)?;
        Ok(doc.as_bytes().to_vec())
    }

    fn import_public(bytes: &[u8]) -> Result<P256PublicKey, AsymmetricError> {
        P256PublicKey::from_public_key_der(bytes).map_err(|_| AsymmetricError::InvalidPublicKey)
    }

    /// SEC1 uncompressed: `0x04 || x || y`, 65 bytes.
    fn export_public_raw(public: &P256PublicKey) -> Result<Vec<u8>, AsymmetricError> {
        Ok(public.to_encoded_point(false).as_bytes().to_vec())
    }

    /// Accepts compressed or uncompressed SEC1.
    fn import_public_raw(bytes: &[u8]) -> Result<P256PublicKey, AsymmetricError> {
        P256PublicKey::from_sec1_bytes(bytes).map_err(|_| AsymmetricError::InvalidPublicKey)
    }

    fn derive_shared_secret(
        private: &SecretKey,
        remote: &P256PublicKey,
    ) -> Result<SecretBytes, AsymmetricError> {
        let shared = diffie_hellman(private.to_nonzero_scalar(), remote.as_affine());
        Ok(secret(shared.raw_secret_bytes().to_vec()))
    }
}
