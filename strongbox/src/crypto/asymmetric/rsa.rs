//! # RSA
//!
//! RSA via the `rsa` crate. Encryption is OAEP with SHA-256 (label-less),
//! signatures are PKCS#1 v1.5 over SHA-256. No raw/textbook RSA, no
//! PKCS#1 v1.5 *encryption*: Bleichenbacher has been eating that one
//! since 1998.
//!
//! The modulus size is a const generic, so `KeyPair<Rsa<4096>>` refuses to
//! import a 2048-bit key instead of quietly downgrading.
//!
//! OAEP-SHA256 caps the plaintext at `k - 66` bytes (190 bytes for 2048-bit
//! keys). RSA is for wrapping keys, not for bulk data.

use ::rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use ::rsa::signature::{SignatureEncoding, Signer, Verifier};
use ::rsa::traits::PublicKeyParts;
use ::rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand::rngs::OsRng;
use sha2::Sha256;

use super::{AsymmetricAlgorithm, AsymmetricError, Capabilities};
use crate::config::DEFAULT_RSA_BITS;
use crate::crypto::wipe::{secret, SecretBytes};

/// RSA with a `BITS`-bit modulus.
#[derive(Debug, Clone, Copy)]
pub struct Rsa<const BITS: usize = DEFAULT_RSA_BITS>;

pub type Rsa2048 = Rsa<2048>;
pub type Rsa3072 = Rsa<3072>;
pub type Rsa4096 = Rsa<4096>;

impl<const BITS: usize> AsymmetricAlgorithm for Rsa<BITS> {
    const NAME: &'static str = "RSA";

    const CAPABILITIES: Capabilities = Capabilities {
        encryption: true,
        signatures: true,
        key_agreement: false,
        raw_public_key: false,
    };

    type PrivateKey = RsaPrivateKey;
    type PublicKey = RsaPublicKey;

    fn generate() -> Result<RsaPrivateKey, AsymmetricError> {
        RsaPrivateKey::new(&mut OsRng, BITS).map_err(|_| AsymmetricError::KeyGeneration)
    }

    fn public_key(private: &RsaPrivateKey) -> RsaPublicKey {
        private.to_public_key()
    }

    fn export_private(private: &RsaPrivateKey) -> Result<SecretBytes, AsymmetricError> {
        let doc = private
            .to_pkcs8_der()
            .map_err(|_| AsymmetricError::ExportFailed)?;
        Ok(secret(doc.as_bytes().to_vec()))
    }

    fn import_private(bytes: &[u8]) -> Result<RsaPrivateKey, AsymmetricError> {
        let key =
            RsaPrivateKey::from_pkcs8_der(bytes).map_err(|_| AsymmetricError::InvalidPrivateKey)?;
        if key.size() * 8 != BITS {
            return Err(AsymmetricError::InvalidPrivateKey);
        }
        Ok(key)
    }

    fn export_public(public: &RsaPublicKey) -> Result<Vec<u8>, AsymmetricError> {
        let doc = public
            .to_public_key_der()
            .map_err(|_| AsymmetricError::ExportFailed)?;
        Ok(doc.as_bytes().to_vec())
    }

    fn import_public(bytes: &[u8]) -> Result<RsaPublicKey, AsymmetricError> {
        let key =
            RsaPublicKey::from_public_key_der(bytes).map_err(|_| AsymmetricError::InvalidPublicKey)?;
        if key.size() * 8 != BITS {
            return Err(AsymmetricError::InvalidPublicKey);
        }
        Ok(key)
    }

    fn encrypt(public: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        public
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
            .map_err(|_| AsymmetricError::EncryptFailed)
    }

    fn decrypt(private: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        private
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|_| AsymmetricError::DecryptFailed)
    }

    fn sign(private: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        let signing_key = SigningKey::<Sha256>::new(private.clone());
        let signature = signing_key
            .try_sign(message)
            .map_err(|_| AsymmetricError::SignFailed)?;
        Ok(signature.to_vec())
    }

    fn verify(
        public: &RsaPublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, AsymmetricError> {
        let Ok(signature) = Signature::try_from(signature) else {
            return Ok(false);
        };
        let verifying_key = VerifyingKey::<Sha256>::new(public.clone());
        Ok(verifying_key.verify(message, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::asymmetric::{KeyPair, PublicKey};

    // 2048-bit generation is the slow part of this module's tests; keep
    // the number of fresh keys low.

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let pair = KeyPair::<Rsa2048>::generate().unwrap();
        let ct = pair.public_key().encrypt(b"wrap me").unwrap();
        assert_eq!(ct.len(), 256);
        assert_eq!(pair.decrypt(&ct).unwrap(), b"wrap me");

        // OAEP is randomized: same plaintext, different ciphertext.
        let ct2 = pair.encrypt(b"wrap me").unwrap();
        assert_ne!(ct, ct2);

        let mut tampered = ct;
        tampered[10] ^= 0x01;
        assert!(matches!(
            pair.decrypt(&tampered),
            Err(AsymmetricError::DecryptFailed)
        ));

        // 191 bytes is one past the OAEP-SHA256 limit for a 2048-bit modulus.
        assert!(pair.encrypt(&[0u8; 191]).is_err());
        assert!(pair.encrypt(&[0u8; 190]).is_ok());
    }

    #[test]
    fn test_sign_verify_and_export() {
        let pair = KeyPair::<Rsa2048>::generate().unwrap();
        let sig = pair.sign(b"message").unwrap();
        assert_eq!(sig.len(), 256);
        assert!(pair.verify(b"message", &sig).unwrap());
        assert!(!pair.verify(b"massage", &sig).unwrap());
        assert!(!pair.verify(b"message", &sig[..100]).unwrap());

        // PKCS#1 v1.5 signatures are deterministic.
        assert_eq!(sig, pair.sign(b"message").unwrap());

        let der = pair.export_private().unwrap();
        let restored = KeyPair::<Rsa2048>::import(&der).unwrap();
        assert_eq!(restored.public_key(), pair.public_key());

        let spki = pair.public_key().export().unwrap();
        let public = PublicKey::<Rsa2048>::import(&spki).unwrap();
        assert!(public.verify(b"message", &sig).unwrap());

        // Modulus size is part of the type.
        assert!(matches!(
            KeyPair::<Rsa4096>::import(&der),
            Err(AsymmetricError::InvalidPrivateKey)
        ));
        assert!(matches!(
            PublicKey::<Rsa3072>::import(&spki),
            Err(AsymmetricError::InvalidPublicKey)
        ));
        assert!(public.export_raw().is_err());
    }

    #[test]
    fn test_garbage_der_rejected() {
        assert!(matches!(
            KeyPair::<Rsa2048>::import(b"definitely not DER"),
            Err(AsymmetricError::InvalidPrivateKey)
        ));
        assert!(PublicKey::<Rsa2048>::import(&[0x30, 0x00]).is_err());
    }
}
