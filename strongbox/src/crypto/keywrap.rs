//! # Password-Based Key Wrapping
//!
//! Turns an exported private key into a JSON envelope that is safe to put
//! on disk, and back again given the right password.
//!
//! ## Construction
//!
//! ```text
//! salt  = 16 random bytes
//! KEK   = KDF(password, salt)           -- PBKDF2-HMAC-SHA256 or Argon2id
//! body  = AES-256-GCM(KEK, nonce, secret, aad = header)
//! ```
//!
//! The header (version, algorithm label, KDF parameters, key id, creation
//! time) is bound as AAD, so editing the envelope's metadata is as fatal
//! as editing its ciphertext. Downgrading the iteration count in the JSON doesn't get an
//! attacker a cheaper brute force; it gets them a decryption failure.
//!
//! ## Errors
//!
//! A wrong password and a tampered envelope both surface as
//! [`KeyWrapError::WrongPassword`]. We can't tell them apart, and we
//! wouldn't tell you if we could.

use aes_gcm::Aes256Gcm;
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::asymmetric::{AsymmetricAlgorithm, AsymmetricError, KeyPair};
use super::encoding::serde_base64;
use super::symmetric::SymmetricCipher;
use super::wipe::{secret, SecretBytes};
use crate::config::{
    KdfParams, WrapParams, AES_KEY_LENGTH, AES_NONCE_LENGTH, KDF_SALT_LENGTH,
    MAX_ARGON2_ITERATIONS, MAX_ARGON2_MEMORY_KIB, MAX_ARGON2_PARALLELISM, MAX_PBKDF2_ITERATIONS,
    MIN_PBKDF2_ITERATIONS, WRAP_ENVELOPE_VERSION,
};

/// Algorithm label for secrets wrapped without a key-pair type.
pub const RAW_SECRET_LABEL: &str = "raw";

const AAD_DOMAIN: &[u8] = b"strongbox/keywrap";

#[derive(Debug, Error)]
pub enum KeyWrapError {
    #[error("wrong password or corrupted envelope")]
    WrongPassword,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("KDF parameters too weak: {0}")]
    WeakParameters(String),

    #[error("KDF parameters too expensive: {0}")]
    ExcessiveParameters(String),

    #[error("invalid KDF parameters")]
    InvalidKdfParams,

    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),

    #[error("envelope holds a {found} key, expected {expected}")]
    AlgorithmMismatch { expected: String, found: String },

    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("encryption failed")]
    EncryptFailed,

    #[error(transparent)]
    Key(#[from] AsymmetricError),
}

/// A password-wrapped secret. Serializes to JSON with base64 byte fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKey {
    pub version: u8,
    /// What the secret is (`"Ed25519"`, `"RSA"`, `"raw"`...).
    pub algorithm: String,
    pub kdf: KdfParams,
    #[serde(with = "serde_base64")]
    pub salt: Vec<u8>,
    #[serde(with = "serde_base64")]
    pub nonce: Vec<u8>,
    /// Encrypted secret with the GCM tag appended.
    #[serde(with = "serde_base64")]
    pub ciphertext: Vec<u8>,
    pub key_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl WrappedKey {
    pub fn to_json(&self) -> Result<String, KeyWrapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, KeyWrapError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Bytes bound into the AEAD tag. Length-prefixed so no two headers
    /// serialize to the same AAD.
    fn header_aad(&self) -> Vec<u8> {
        let mut aad = Vec::with_capacity(64 + self.algorithm.len());
        aad.extend_from_slice(AAD_DOMAIN);
        aad.push(self.version);
        aad.extend_from_slice(&(self.algorithm.len() as u32).to_be_bytes());
        aad.extend_from_slice(self.algorithm.as_bytes());
        match self.kdf {
            KdfParams::Pbkdf2 { iterations } => {
                aad.push(1);
                aad.extend_from_slice(&iterations.to_be_bytes());
            }
            KdfParams::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => {
                aad.push(2);
                aad.extend_from_slice(&memory_kib.to_be_bytes());
                aad.extend_from_slice(&iterations.to_be_bytes());
                aad.extend_from_slice(&parallelism.to_be_bytes());
            }
        }
        aad.extend_from_slice(self.key_id.as_bytes());
        aad.extend_from_slice(&self.created_at.timestamp().to_be_bytes());
        aad.extend_from_slice(&self.created_at.timestamp_subsec_nanos().to_be_bytes());
        aad
    }
}

/// Refuse parameters that are too cheap or that the KDF itself rejects.
pub fn validate_params(kdf: &KdfParams) -> Result<(), KeyWrapError> {
    match *kdf {
        KdfParams::Pbkdf2 { iterations } if iterations < MIN_PBKDF2_ITERATIONS => {
            Err(KeyWrapError::WeakParameters(format!(
                "{iterations} PBKDF2 iterations, minimum is {MIN_PBKDF2_ITERATIONS}"
            )))
        }
        KdfParams::Pbkdf2 { iterations } if iterations > MAX_PBKDF2_ITERATIONS => {
            Err(KeyWrapError::ExcessiveParameters(format!(
                "{iterations} PBKDF2 iterations, maximum is {MAX_PBKDF2_ITERATIONS}"
            )))
        }
        KdfParams::Pbkdf2 { .. } => Ok(()),
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => {
            if memory_kib > MAX_ARGON2_MEMORY_KIB {
                return Err(KeyWrapError::ExcessiveParameters(format!(
                    "{memory_kib} KiB Argon2id memory, maximum is {MAX_ARGON2_MEMORY_KIB}"
                )));
            }
            if iterations > MAX_ARGON2_ITERATIONS {
                return Err(KeyWrapError::ExcessiveParameters(format!(
                    "{iterations} Argon2id passes, maximum is {MAX_ARGON2_ITERATIONS}"
                )));
            }
            if parallelism > MAX_ARGON2_PARALLELISM {
                return Err(KeyWrapError::ExcessiveParameters(format!(
                    "{parallelism} Argon2id lanes, maximum is {MAX_ARGON2_PARALLELISM}"
                )));
            }
            argon2_params(kdf).map(|_| ())
        }
    }
}

fn argon2_params(kdf: &KdfParams) -> Result<Params, KeyWrapError> {
    match *kdf {
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => Params::new(memory_kib, iterations, parallelism, Some(AES_KEY_LENGTH))
            .map_err(|_| KeyWrapError::InvalidKdfParams),
        KdfParams::Pbkdf2 { .. } => Err(KeyWrapError::InvalidKdfParams),
    }
}

/// Stretch `password` into a 32-byte key-encryption key.
fn derive_kek(password: &[u8], salt: &[u8], kdf: &KdfParams) -> Result<SecretBytes, KeyWrapError> {
    validate_params(kdf)?;
    let mut kek = secret(vec![0u8; AES_KEY_LENGTH]);
    match *kdf {
        KdfParams::Pbkdf2 { iterations } => {
            pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut kek[..]);
        }
        KdfParams::Argon2id { .. } => {
            let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params(kdf)?);
            argon
                .hash_password_into(password, salt, &mut kek[..])
                .map_err(|_| KeyWrapError::InvalidKdfParams)?;
        }
    }
    Ok(kek)
}

/// Wrap an arbitrary secret under `password`.
pub fn wrap_key(
    secret_bytes: &[u8],
    password: &[u8],
    params: &WrapParams,
) -> Result<WrappedKey, KeyWrapError> {
    wrap_labeled(secret_bytes, RAW_SECRET_LABEL, Uuid::new_v4(), password, params)
}

fn wrap_labeled(
    secret_bytes: &[u8],
    algorithm: &str,
    key_id: Uuid,
    password: &[u8],
    params: &WrapParams,
) -> Result<WrappedKey, KeyWrapError> {
    if password.is_empty() {
        return Err(KeyWrapError::EmptyPassword);
    }

    let mut salt = vec![0u8; KDF_SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);

    let mut envelope = WrappedKey {
        version: WRAP_ENVELOPE_VERSION,
        algorithm: algorithm.to_string(),
        kdf: params.kdf,
        salt,
        nonce: Vec::new(),
        ciphertext: Vec::new(),
        key_id,
        created_at: Utc::now(),
    };

    let kek = derive_kek(password, &envelope.salt, &envelope.kdf)?;
    let cipher = SymmetricCipher::<Aes256Gcm>::new(&kek).map_err(|_| KeyWrapError::EncryptFailed)?;
    let mut sealed = cipher
        .encrypt_with_aad(secret_bytes, &envelope.header_aad())
        .map_err(|_| KeyWrapError::EncryptFailed)?;

    envelope.ciphertext = sealed.split_off(AES_NONCE_LENGTH);
    envelope.nonce = sealed;

    debug!(
        algorithm,
        kdf = envelope.kdf.name(),
        key_id = %envelope.key_id,
        "wrapped key"
    );
    Ok(envelope)
}

/// Recover the secret from `envelope`.
pub fn unwrap_key(envelope: &WrappedKey, password: &[u8]) -> Result<SecretBytes, KeyWrapError> {
    if envelope.version != WRAP_ENVELOPE_VERSION {
        return Err(KeyWrapError::UnsupportedVersion(envelope.version));
    }
    if envelope.nonce.len() != AES_NONCE_LENGTH {
        return Err(KeyWrapError::WrongPassword);
    }

    let kek = derive_kek(password, &envelope.salt, &envelope.kdf)?;
    let cipher = SymmetricCipher::<Aes256Gcm>::new(&kek).map_err(|_| KeyWrapError::WrongPassword)?;

    let mut sealed = Vec::with_capacity(envelope.nonce.len() + envelope.ciphertext.len());
    sealed.extend_from_slice(&envelope.nonce);
    sealed.extend_from_slice(&envelope.ciphertext);

    let plaintext = cipher
        .decrypt_with_aad(&sealed, &envelope.header_aad())
        .map_err(|_| KeyWrapError::WrongPassword)?;

    debug!(key_id = %envelope.key_id, "unwrapped key");
    Ok(secret(plaintext))
}

/// Change the password (and optionally the KDF) of an envelope. The key id
/// and algorithm label carry over.
pub fn rewrap(
    envelope: &WrappedKey,
    old_password: &[u8],
    new_password: &[u8],
    params: &WrapParams,
) -> Result<WrappedKey, KeyWrapError> {
    let inner = unwrap_key(envelope, old_password)?;
    wrap_labeled(
        &inner,
        &envelope.algorithm,
        envelope.key_id,
        new_password,
        params,
    )
}

impl<A: AsymmetricAlgorithm> KeyPair<A> {
    /// Export the private key wrapped under `password`.
    pub fn export_wrapped(
        &self,
        password: &[u8],
        params: &WrapParams,
    ) -> Result<WrappedKey, KeyWrapError> {
        let exported = self.export_private()?;
        wrap_labeled(&exported, A::NAME, Uuid::new_v4(), password, params)
    }

    /// Import a key exported with [`export_wrapped`](Self::export_wrapped).
    /// The envelope must be labeled with this algorithm.
    pub fn import_wrapped(envelope: &WrappedKey, password: &[u8]) -> Result<Self, KeyWrapError> {
        if envelope.algorithm != A::NAME {
            return Err(KeyWrapError::AlgorithmMismatch {
                expected: A::NAME.to_string(),
                found: envelope.algorithm.clone(),
            });
        }
        let exported = unwrap_key(envelope, password)?;
        Ok(Self::import(&exported)?)
    }
}
