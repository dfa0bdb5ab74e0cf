//! # Ed25519
//!
//! Ed25519 via `ed25519-dalek`. Verification uses `verify_strict`, which
//! rejects small-order public keys and non-canonical signatures. Plain
//! `verify` accepts some signatures that other implementations don't, and
//! "valid here but not there" is how consensus bugs and double-spends are
//! born.

use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH};
use rand::rngs::OsRng;

use super::{AsymmetricAlgorithm, AsymmetricError, Capabilities};
use crate::crypto::wipe::{secret, SecretBytes};

/// Ed25519 signatures.
#[derive(Debug, Clone, Copy)]
pub struct Ed25519;

impl AsymmetricAlgorithm for Ed25519 {
    const NAME: &'static str = "Ed25519";

    const CAPABILITIES: Capabilities = Capabilities {
        encryption: false,
        signatures: true,
        key_agreement: false,
        raw_public_key: true,
    };

    type PrivateKey = SigningKey;
    type PublicKey = VerifyingKey;

    fn generate() -> Result<SigningKey, AsymmetricError> {
        Ok(SigningKey::generate(&mut OsRng))
    }

    fn public_key(private: &SigningKey) -> VerifyingKey {
        private.verifying_key()
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
        Ok(public.to_bytes().to_vec())
    }

    fn import_public_raw(bytes: &[u8]) -> Result<VerifyingKey, AsymmetricError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| AsymmetricError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| AsymmetricError::InvalidPublicKey)
    }

    fn sign(private: &SigningKey, message: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        Ok(private.sign(message).to_bytes().to_vec())
    }

    fn verify(
        public: &VerifyingKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, AsymmetricError> {
        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };
        Ok(public.verify_strict(message, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ED25519_SIGNATURE_LENGTH;
    use crate::crypto::asymmetric::{KeyPair, PublicKey};

    #[test]
    fn test_sign_and_verify() {
        let pair = KeyPair::<Ed25519>::generate().unwrap();
        let sig = pair.sign(b"hello, strongbox").unwrap();
        assert_eq!(sig.len(), ED25519_SIGNATURE_LENGTH);
        assert!(pair.verify(b"hello, strongbox", &sig).unwrap());
    }

    #[test]
    fn test_wrong_message_fails() {
        let pair = KeyPair::<Ed25519>::generate().unwrap();
        let sig = pair.sign(b"correct message").unwrap();
        assert!(!pair.verify(b"wrong message", &sig).unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let alice = KeyPair::<Ed25519>::generate().unwrap();
        let bob = KeyPair::<Ed25519>::generate().unwrap();
        let sig = alice.sign(b"from alice").unwrap();
        assert!(!bob.public_key().verify(b"from alice", &sig).unwrap());
    }

    #[test]
    fn test_empty_message() {
        // Empty messages are valid input. Weird, but valid.
        let pair = KeyPair::<Ed25519>::generate().unwrap();
        let sig = pair.sign(b"").unwrap();
        assert!(pair.verify(b"", &sig).unwrap());
    }

    #[test]
    fn test_truncated_signature_is_false() {
        let pair = KeyPair::<Ed25519>::generate().unwrap();
        let sig = pair.sign(b"msg").unwrap();
        assert!(!pair.verify(b"msg", &sig[..63]).unwrap());
    }

    #[test]
    fn test_pkcs8_and_raw_roundtrip() {
        let pair = KeyPair::<Ed25519>::generate().unwrap();
        let restored = KeyPair::<Ed25519>::import(&pair.export_private().unwrap()).unwrap();
        assert_eq!(restored.public_key(), pair.public_key());

        let raw = pair.public_key().export_raw().unwrap();
        assert_eq!(raw.len(), 32);
        assert_eq!(PublicKey::<Ed25519>::import_raw(&raw).unwrap(), pair.public_key());
        assert!(PublicKey::<Ed25519>::import_raw(&raw[..31]).is_err());
    }

    #[test]
    fn test_rfc8032_vector_1() {
        // RFC 8032 section 7.1, TEST 1: empty message.
        let seed: [u8; 32] =
            hex::decode("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
                .unwrap()
                .try_into()
                .unwrap();
        let pair = KeyPair::<Ed25519>::from_private(SigningKey::from_bytes(&seed));
        assert_eq!(
            hex::encode(pair.public_key().export_raw().unwrap()),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
        let sig = pair.sign(b"").unwrap();
        assert_eq!(
            hex::encode(&sig),
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
             5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        );
    }
}
