//! # Asymmetric Algorithms
//!
//! One trait, [`AsymmetricAlgorithm`], over every public-key backend we
//! wrap. The trait has a method for each operation the external libraries
//! offer (encrypt, decrypt, sign, verify, key agreement). An algorithm that
//! can't do one of them simply doesn't override it, and the default returns
//! [`AsymmetricError::Unsupported`]. Asking X25519 for a signature is a
//! clean error, not a panic and not a silent no-op.
//!
//! | Algorithm | encrypt | sign | agree | native export |
//! |-----------|---------|------|-------|---------------|
//! | [`Rsa`]   | OAEP-SHA256 | PKCS#1 v1.5 SHA-256 | — | PKCS#8 / SPKI DER |
//! | [`EcdhP256`] | — | — | ECDH | PKCS#8 / SPKI DER |
//! | [`EcdsaP256`] | — | ECDSA SHA-256 | — | PKCS#8 / SPKI DER |
//! | [`Ed25519`] | — | Ed25519 | — | PKCS#8 / SPKI DER |
//! | [`X25519`] | — | — | X25519 | raw 32 bytes |
//!
//! Algorithms are zero-sized marker types. Keys live in [`KeyPair<A>`] and
//! [`PublicKey<A>`], so the compiler won't let you verify an Ed25519
//! signature with an RSA key.

pub mod ecdh;
pub mod ecdsa;
pub mod ed25519;
pub mod rsa;
pub mod x25519;

use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::encoding::{self, EncodingError, HexCase};
use super::hash::sha256;
use super::wipe::SecretBytes;

pub use self::ecdh::EcdhP256;
pub use self::ecdsa::EcdsaP256;
pub use self::ed25519::Ed25519;
pub use self::rsa::{Rsa, Rsa2048, Rsa3072, Rsa4096};
pub use self::x25519::X25519;

/// The operations an algorithm may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    KeyAgreement,
    RawPublicKey,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Encrypt => "encryption",
            Operation::Decrypt => "decryption",
            Operation::Sign => "signing",
            Operation::Verify => "signature verification",
            Operation::KeyAgreement => "key agreement",
            Operation::RawPublicKey => "raw public key encoding",
        };
        f.write_str(name)
    }
}

/// What an algorithm can do. Static per algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub encryption: bool,
    pub signatures: bool,
    pub key_agreement: bool,
    pub raw_public_key: bool,
}

impl Capabilities {
    /// Whether `op` is expected to succeed (modulo bad inputs).
    pub fn supports(&self, op: Operation) -> bool {
        match op {
            Operation::Encrypt | Operation::Decrypt => self.encryption,
            Operation::Sign | Operation::Verify => self.signatures,
            Operation::KeyAgreement => self.key_agreement,
            Operation::RawPublicKey => self.raw_public_key,
        }
    }
}

/// Errors from public-key operations.
///
/// Two families: `Unsupported`, which is static ("this algorithm never
/// does that"), and everything else, which is the backend telling us the
/// input was bad. We don't say *how* it was bad.
#[derive(Debug, Error)]
pub enum AsymmetricError {
    #[error("{algorithm} does not support {operation}")]
    Unsupported {
        algorithm: &'static str,
        operation: Operation,
    },

    #[error("key generation failed")]
    KeyGeneration,

    #[error("invalid private key material")]
    InvalidPrivateKey,

    #[error("invalid public key material")]
    InvalidPublicKey,

    #[error("key export failed")]
    ExportFailed,

    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("signing failed")]
    SignFailed,

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("key agreement failed")]
    AgreementFailed,

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// A public-key algorithm backed by an external implementation.
///
/// Implementors are marker types. Only `generate`, `public_key` and the
/// four import/export methods are mandatory; the rest default to
/// [`AsymmetricError::Unsupported`].
pub trait AsymmetricAlgorithm {
    /// Human-readable algorithm name, used in errors and logs.
    const NAME: &'static str;

    /// Which optional operations are overridden.
    const CAPABILITIES: Capabilities;

    /// Backend private key type. Expected to wipe itself on drop.
    type PrivateKey;

    /// Backend public key type.
    type PublicKey: Clone + PartialEq + fmt::Debug;

    /// [`CAPABILITIES`](Self::CAPABILITIES), for callers holding a generic.
    fn capabilities() -> Capabilities {
        Self::CAPABILITIES
    }

    fn generate() -> Result<Self::PrivateKey, AsymmetricError>;

    fn public_key(private: &Self::PrivateKey) -> Self::PublicKey;

    /// Private key in the backend's native export format.
    fn export_private(private: &Self::PrivateKey) -> Result<SecretBytes, AsymmetricError>;

    fn import_private(bytes: &[u8]) -> Result<Self::PrivateKey, AsymmetricError>;

    /// Public key in the backend's native export format.
    fn export_public(public: &Self::PublicKey) -> Result<Vec<u8>, AsymmetricError>;

    fn import_public(bytes: &[u8]) -> Result<Self::PublicKey, AsymmetricError>;

    /// Compact point encoding (SEC1 uncompressed for NIST curves, 32 bytes
    /// for the 25519 family).
    fn export_public_raw(_public: &Self::PublicKey) -> Result<Vec<u8>, AsymmetricError> {
        Err(unsupported::<Self>(Operation::RawPublicKey))
    }

    fn import_public_raw(_bytes: &[u8]) -> Result<Self::PublicKey, AsymmetricError> {
        Err(unsupported::<Self>(Operation::RawPublicKey))
    }

    fn encrypt(_public: &Self::PublicKey, _plaintext: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        Err(unsupported::<Self>(Operation::Encrypt))
    }

    fn decrypt(_private: &Self::PrivateKey, _ciphertext: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        Err(unsupported::<Self>(Operation::Decrypt))
    }

    fn sign(_private: &Self::PrivateKey, _message: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        Err(unsupported::<Self>(Operation::Sign))
    }

    /// `Ok(false)` for a well-formed request with a bad signature
    /// (including a signature of the wrong length). `Err` only when the
    /// algorithm can't verify at all.
    fn verify(
        _public: &Self::PublicKey,
        _message: &[u8],
        _signature: &[u8],
    ) -> Result<bool, AsymmetricError> {
        Err(unsupported::<Self>(Operation::Verify))
    }

    /// Raw shared secret, before any KDF. See
    /// [`AgreementParameters`](crate::crypto::agreement::AgreementParameters)
    /// for turning it into a key.
    fn derive_shared_secret(
        _private: &Self::PrivateKey,
        _remote: &Self::PublicKey,
    ) -> Result<SecretBytes, AsymmetricError> {
        Err(unsupported::<Self>(Operation::KeyAgreement))
    }
}

/// Build the "not supported" error for algorithm `A`.
pub fn unsupported<A: AsymmetricAlgorithm + ?Sized>(operation: Operation) -> AsymmetricError {
    AsymmetricError::Unsupported {
        algorithm: A::NAME,
        operation,
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// A private key and its public half, for algorithm `A`.
///
/// Deliberately not `Serialize`. Exporting a private key should be a
/// conscious call to [`export_private`](Self::export_private) or
/// `export_wrapped`, not a side effect of putting a struct in a JSON
/// response.
pub struct KeyPair<A: AsymmetricAlgorithm> {
    private: A::PrivateKey,
    public: A::PublicKey,
}

impl<A: AsymmetricAlgorithm> KeyPair<A> {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Result<Self, AsymmetricError> {
        let private = A::generate()?;
        debug!(algorithm = A::NAME, "generated key pair");
        Ok(Self::from_private(private))
    }

    /// Wrap an existing backend private key.
    pub fn from_private(private: A::PrivateKey) -> Self {
        let public = A::public_key(&private);
        Self { private, public }
    }

    /// Load a private key from its native export format.
    pub fn import(bytes: &[u8]) -> Result<Self, AsymmetricError> {
        Ok(Self::from_private(A::import_private(bytes)?))
    }

    /// Private key in its native export format, wiped on drop.
    ///
    /// **Handle with care.** Prefer `export_wrapped` for anything that
    /// leaves the process.
    pub fn export_private(&self) -> Result<SecretBytes, AsymmetricError> {
        A::export_private(&self.private)
    }

    /// The public half, as an owned, shareable value.
    pub fn public_key(&self) -> PublicKey<A> {
        PublicKey {
            key: self.public.clone(),
        }
    }

    /// Borrow the backend private key. For callers that need to talk to the
    /// backend crate directly; try not to pass it around.
    pub fn private_key(&self) -> &A::PrivateKey {
        &self.private
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        A::sign(&self.private, message)
    }

    /// Verify against this pair's own public key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, AsymmetricError> {
        A::verify(&self.public, message, signature)
    }

    /// Encrypt to this pair's own public key.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        A::encrypt(&self.public, plaintext)
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        A::decrypt(&self.private, ciphertext)
    }

    /// Raw shared secret with `remote`. Run it through a KDF before use.
    pub fn derive_shared_secret(&self, remote: &PublicKey<A>) -> Result<SecretBytes, AsymmetricError> {
        A::derive_shared_secret(&self.private, &remote.key)
    }

    /// Algorithm name.
    pub fn algorithm(&self) -> &'static str {
        A::NAME
    }

    pub fn capabilities(&self) -> Capabilities {
        A::capabilities()
    }
}

impl<A: AsymmetricAlgorithm> fmt::Debug for KeyPair<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print private key material. Not even "partially."
        write!(f, "KeyPair<{}>(pub={})", A::NAME, self.public_key().fingerprint())
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// The public half of a key pair for algorithm `A`. Safe to share.
pub struct PublicKey<A: AsymmetricAlgorithm> {
    key: A::PublicKey,
}

impl<A: AsymmetricAlgorithm> PublicKey<A> {
    /// Wrap an existing backend public key.
    pub fn from_inner(key: A::PublicKey) -> Self {
        Self { key }
    }

    /// Parse the native export format.
    pub fn import(bytes: &[u8]) -> Result<Self, AsymmetricError> {
        Ok(Self {
            key: A::import_public(bytes)?,
        })
    }

    /// Parse the compact point encoding.
    pub fn import_raw(bytes: &[u8]) -> Result<Self, AsymmetricError> {
        Ok(Self {
            key: A::import_public_raw(bytes)?,
        })
    }

    pub fn export(&self) -> Result<Vec<u8>, AsymmetricError> {
        A::export_public(&self.key)
    }

    pub fn export_raw(&self) -> Result<Vec<u8>, AsymmetricError> {
        A::export_public_raw(&self.key)
    }

    pub fn to_base64(&self) -> Result<String, AsymmetricError> {
        Ok(encoding::to_base64(&self.export()?))
    }

    pub fn from_base64(s: &str) -> Result<Self, AsymmetricError> {
        Self::import(&encoding::from_base64(s)?)
    }

    pub fn to_hex(&self, case: HexCase) -> Result<String, AsymmetricError> {
        Ok(encoding::to_hex(&self.export()?, case))
    }

    pub fn from_hex(s: &str) -> Result<Self, AsymmetricError> {
        Self::import(&encoding::from_hex(s)?)
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, AsymmetricError> {
        A::verify(&self.key, message, signature)
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, AsymmetricError> {
        A::encrypt(&self.key, plaintext)
    }

    /// First 16 hex chars of SHA-256 over the exported key. For logs and
    /// `Debug`, not for security decisions.
    pub fn fingerprint(&self) -> String {
        match self.export() {
            Ok(bytes) => hex::encode(&sha256(&bytes)[..8]),
            Err(_) => "unexportable".to_string(),
        }
    }

    pub fn inner(&self) -> &A::PublicKey {
        &self.key
    }
}

impl<A: AsymmetricAlgorithm> Clone for PublicKey<A> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
        }
    }
}

impl<A: AsymmetricAlgorithm> PartialEq for PublicKey<A> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<A: AsymmetricAlgorithm> fmt::Debug for PublicKey<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey<{}>({})", A::NAME, self.fingerprint())
    }
}
