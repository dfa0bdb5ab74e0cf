//! # Symmetric Encryption
//!
//! [`SymmetricCipher`] is generic over any RustCrypto AEAD. In practice that
//! means AES-128-GCM and AES-256-GCM, which get type aliases, but nothing
//! here cares which AEAD it is driving.
//!
//! ## Nonce management
//!
//! GCM is notoriously unforgiving about nonce reuse: two messages under the
//! same (key, nonce) leak the XOR of the plaintexts and let an attacker forge
//! tags. We generate a fresh random nonce for every message and prepend it
//! to the output. The birthday bound for 96-bit nonces is ~2^48 messages per
//! key; rotate long before that.
//!
//! ## Wire format
//!
//! `nonce || ciphertext || tag`. The nonce length is whatever the AEAD
//! says (12 bytes for AES-GCM), the tag is appended by the AEAD itself.

use std::fmt;

use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, KeySizeUser, Nonce, Payload};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use tracing::trace;

use super::wipe::{secret, SecretBytes};
use crate::config::AES_KEY_LENGTH;

/// Errors from symmetric encryption and decryption.
///
/// Deliberately coarse. "Wrong key" and "tampered ciphertext" look the same
/// from the outside, and that's how it should stay.
#[derive(Debug, Error)]
pub enum SymmetricError {
    #[error("invalid key length: expected {expected} bytes")]
    InvalidKeyLength { expected: usize },

    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("ciphertext too short: must be at least {minimum} bytes")]
    CiphertextTooShort { minimum: usize },
}

/// AES-128-GCM.
pub type Aes128GcmCipher = SymmetricCipher<aes_gcm::Aes128Gcm>;

/// AES-256-GCM. The default everywhere else in this crate.
pub type Aes256GcmCipher = SymmetricCipher<aes_gcm::Aes256Gcm>;

/// An AEAD cipher bound to one key. The expanded key schedule lives inside
/// `A`; the raw key is not retained.
pub struct SymmetricCipher<A> {
    cipher: A,
}

impl<A> SymmetricCipher<A>
where
    A: Aead + AeadCore + KeyInit,
{
    /// Key length in bytes.
    pub fn key_len() -> usize {
        <A as KeySizeUser>::key_size()
    }

    /// Nonce length in bytes.
    pub fn nonce_len() -> usize {
        <A as AeadCore>::NonceSize::USIZE
    }

    /// Authentication tag length in bytes.
    pub fn tag_len() -> usize {
        <A as AeadCore>::TagSize::USIZE
    }

    /// Fresh random key of the right length, wiped on drop.
    pub fn generate_key() -> SecretBytes {
        let mut key = secret(vec![0u8; Self::key_len()]);
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Bind a cipher to `key`. The length is checked, the contents can't be.
    pub fn new(key: &[u8]) -> Result<Self, SymmetricError> {
        let cipher = A::new_from_slice(key).map_err(|_| SymmetricError::InvalidKeyLength {
            expected: Self::key_len(),
        })?;
        Ok(Self { cipher })
    }

    /// Encrypt under a random nonce. Returns `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, SymmetricError> {
        self.encrypt_with_aad(plaintext, &[])
    }

    /// Decrypt `nonce || ciphertext || tag` as produced by
    /// [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SymmetricError> {
        self.decrypt_with_aad(data, &[])
    }

    /// Encrypt with Additional Authenticated Data.
    ///
    /// The AAD is authenticated but not encrypted, and is not included in
    /// the output. The caller must present the same AAD to decrypt.
    pub fn encrypt_with_aad(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, SymmetricError> {
        let mut nonce_bytes = vec![0u8; Self::nonce_len()];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::<A>::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| SymmetricError::EncryptFailed)?;

        trace!(
            plaintext_len = plaintext.len(),
            aad_len = aad.len(),
            "aead encrypt"
        );

        let mut out = Vec::with_capacity(nonce_bytes.len() + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt data produced by [`encrypt_with_aad`](Self::encrypt_with_aad).
    pub fn decrypt_with_aad(&self, data: &[u8], aad: &[u8]) -> Result<Vec<u8>, SymmetricError> {
        let minimum = Self::nonce_len() + Self::tag_len();
        if data.len() < minimum {
            return Err(SymmetricError::CiphertextTooShort { minimum });
        }

        let (nonce_bytes, ciphertext) = data.split_at(Self::nonce_len());
        let nonce = Nonce::<A>::from_slice(nonce_bytes);

        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| SymmetricError::DecryptFailed)
    }
}

impl<A> fmt::Debug for SymmetricCipher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The cipher state is derived from the key. Print nothing of it.
        write!(f, "SymmetricCipher<{}>", std::any::type_name::<A>())
    }
}

/// One-shot AES-256-GCM encryption with a fixed-size key.
///
/// # Example
///
/// ```
/// use strongbox::crypto::symmetric::{encrypt, decrypt};
///
/// let key = [0x42u8; 32]; // In real code, use a properly derived key!
/// let sealed = encrypt(&key, b"secret").unwrap();
/// assert_eq!(decrypt(&key, &sealed).unwrap(), b"secret");
/// ```
pub fn encrypt(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, SymmetricError> {
    Aes256GcmCipher::new(key)?.encrypt(plaintext)
}

/// One-shot AES-256-GCM decryption with a fixed-size key.
pub fn decrypt(key: &[u8; AES_KEY_LENGTH], data: &[u8]) -> Result<Vec<u8>, SymmetricError> {
    Aes256GcmCipher::new(key)?.decrypt(data)
}
