//! # Key Agreement Parameters
//!
//! A raw Diffie-Hellman output is a curve point coordinate, not a key. It
//! is biased, it is the same for every session between two static keys,
//! and it knows nothing about what you intend to use it for.
//! [`AgreementParameters`] bundles the three decisions both parties must
//! make identically to turn it into one:
//!
//! 1. which hash drives the KDF,
//! 2. which KDF (plain hash, HMAC, or HKDF) and its inputs,
//! 3. how public keys travel on the wire.
//!
//! It's a plain serializable value. Negotiate it once, ship it in a config
//! file or a handshake message, and both ends call
//! [`derive_key`](AgreementParameters::derive_key) with it.
//!
//! ```
//! use strongbox::crypto::agreement::AgreementParameters;
//! use strongbox::crypto::asymmetric::{KeyPair, X25519};
//!
//! let params = AgreementParameters::default();
//! let alice = KeyPair::<X25519>::generate().unwrap();
//! let bob = KeyPair::<X25519>::generate().unwrap();
//!
//! let alice_pub = params.export_public(&alice).unwrap();
//! let bob_pub = params.export_public(&bob).unwrap();
//!
//! let k1 = params.derive_key(&alice, &bob_pub, 32).unwrap();
//! let k2 = params.derive_key(&bob, &alice_pub, 32).unwrap();
//! assert_eq!(k1.as_slice(), k2.as_slice());
//! ```

use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use thiserror::Error;
use tracing::debug;

use super::asymmetric::{AsymmetricAlgorithm, AsymmetricError, KeyPair, PublicKey};
use super::encoding::serde_base64;
use super::hash::{HashAlgorithm, HashError};
use super::wipe::{secret, SecretBytes};

#[derive(Debug, Error)]
pub enum AgreementError {
    #[error("derived key length must be non-zero")]
    EmptyOutput,

    #[error("{kdf} with {hash} yields at most {max} bytes, {requested} requested")]
    OutputTooLong {
        kdf: &'static str,
        hash: HashAlgorithm,
        max: usize,
        requested: usize,
    },

    #[error("{0} cannot drive HKDF")]
    UnsupportedHash(HashAlgorithm),

    #[error(transparent)]
    Key(#[from] AsymmetricError),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// How the raw shared secret `Z` becomes key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyDerivation {
    /// `H(prepend || Z || append)`, truncated.
    Hash {
        #[serde(default, with = "serde_base64")]
        prepend: Vec<u8>,
        #[serde(default, with = "serde_base64")]
        append: Vec<u8>,
    },
    /// `HMAC(key, Z)`, truncated. An empty key means "use `Z` as the key".
    Hmac {
        #[serde(default, with = "serde_base64")]
        key: Vec<u8>,
    },
    /// RFC 5869 extract-and-expand. The only mode that can produce more
    /// than one digest's worth of output.
    Hkdf {
        #[serde(default, with = "serde_base64")]
        salt: Vec<u8>,
        #[serde(default, with = "serde_base64")]
        info: Vec<u8>,
    },
}

impl KeyDerivation {
    pub fn name(&self) -> &'static str {
        match self {
            KeyDerivation::Hash { .. } => "hash",
            KeyDerivation::Hmac { .. } => "hmac",
            KeyDerivation::Hkdf { .. } => "hkdf",
        }
    }
}

impl Default for KeyDerivation {
    fn default() -> Self {
        KeyDerivation::Hash {
            prepend: Vec::new(),
            append: Vec::new(),
        }
    }
}

/// Wire format for the public keys exchanged during agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicKeyFormat {
    /// The backend's native export: SPKI DER for the NIST curves, the bare
    /// 32 bytes for X25519 (which has no DER form in its backend).
    #[default]
    #[serde(alias = "spki")]
    SubjectPublicKeyInfo,
    /// Compact point encoding (SEC1 uncompressed, or 32 bytes for X25519).
    Raw,
}

/// Everything two parties must agree on besides their keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgreementParameters {
    #[serde(default)]
    pub hash: HashAlgorithm,
    #[serde(default)]
    pub kdf: KeyDerivation,
    #[serde(default)]
    pub public_key_format: PublicKeyFormat,
}

impl AgreementParameters {
    pub fn new(hash: HashAlgorithm, kdf: KeyDerivation, public_key_format: PublicKeyFormat) -> Self {
        Self {
            hash,
            kdf,
            public_key_format,
        }
    }

    /// HKDF over `hash` with the given salt and info, native key format.
    pub fn hkdf(hash: HashAlgorithm, salt: &[u8], info: &[u8]) -> Self {
        Self::new(
            hash,
            KeyDerivation::Hkdf {
                salt: salt.to_vec(),
                info: info.to_vec(),
            },
            PublicKeyFormat::default(),
        )
    }

    /// Largest output this parameter set can produce.
    pub fn max_output_len(&self) -> usize {
        match self.kdf {
            KeyDerivation::Hkdf { .. } => 255 * self.hash.digest_len(),
            _ => self.hash.digest_len(),
        }
    }

    /// Our public key, in the format the peer expects.
    pub fn export_public<A: AsymmetricAlgorithm>(
        &self,
        local: &KeyPair<A>,
    ) -> Result<Vec<u8>, AgreementError> {
        let public = local.public_key();
        let bytes = match self.public_key_format {
            PublicKeyFormat::SubjectPublicKeyInfo => public.export()?,
            PublicKeyFormat::Raw => public.export_raw()?,
        };
        Ok(bytes)
    }

    /// Parse a peer's public key per `public_key_format`.
    pub fn import_public<A: AsymmetricAlgorithm>(
        &self,
        bytes: &[u8],
    ) -> Result<PublicKey<A>, AgreementError> {
        let key = match self.public_key_format {
            PublicKeyFormat::SubjectPublicKeyInfo => PublicKey::<A>::import(bytes)?,
            PublicKeyFormat::Raw => PublicKey::<A>::import_raw(bytes)?,
        };
        Ok(key)
    }

    /// Agree with `remote_public` and derive `len` bytes of key material.
    pub fn derive_key<A: AsymmetricAlgorithm>(
        &self,
        local: &KeyPair<A>,
        remote_public: &[u8],
        len: usize,
    ) -> Result<SecretBytes, AgreementError> {
        self.check_len(len)?;
        let remote = self.import_public::<A>(remote_public)?;
        let shared = local.derive_shared_secret(&remote)?;
        debug!(
            algorithm = A::NAME,
            hash = %self.hash,
            kdf = self.kdf.name(),
            len,
            "derived agreement key"
        );
        self.apply_kdf(&shared, len)
    }

    fn check_len(&self, len: usize) -> Result<(), AgreementError> {
        if len == 0 {
            return Err(AgreementError::EmptyOutput);
        }
        if let KeyDerivation::Hkdf { .. } = self.kdf {
            if self.hash == HashAlgorithm::Blake3 {
                return Err(AgreementError::UnsupportedHash(self.hash));
            }
        }
        let max = self.max_output_len();
        if len > max {
            return Err(AgreementError::OutputTooLong {
                kdf: self.kdf.name(),
                hash: self.hash,
                max,
                requested: len,
            });
        }
        Ok(())
    }

    /// Run the configured KDF over an already-agreed secret.
    pub fn apply_kdf(&self, shared: &[u8], len: usize) -> Result<SecretBytes, AgreementError> {
        self.check_len(len)?;
        let mut out = match &self.kdf {
            KeyDerivation::Hash { prepend, append } => {
                secret(self.hash.compute_multi(&[prepend.as_slice(), shared, append.as_slice()]))
            }
            KeyDerivation::Hmac { key } => {
                let key = if key.is_empty() { shared } else { key.as_slice() };
                secret(self.hash.hmac(key, shared)?)
            }
            KeyDerivation::Hkdf { salt, info } => {
                let mut okm = secret(vec![0u8; len]);
                hkdf_expand(self.hash, salt, shared, info, &mut okm[..])?;
                okm
            }
        };
        out.truncate(len);
        Ok(out)
    }
}

fn hkdf_expand(
    hash: HashAlgorithm,
    salt: &[u8],
    ikm: &[u8],
    info: &[u8],
    okm: &mut [u8],
) -> Result<(), AgreementError> {
    let salt = (!salt.is_empty()).then_some(salt);
    let expanded = match hash {
        HashAlgorithm::Sha1 => Hkdf::<Sha1>::new(salt, ikm).expand(info, okm),
        HashAlgorithm::Sha256 => Hkdf::<Sha256>::new(salt, ikm).expand(info, okm),
        HashAlgorithm::Sha384 => Hkdf::<Sha384>::new(salt, ikm).expand(info, okm),
        HashAlgorithm::Sha512 => Hkdf::<Sha512>::new(salt, ikm).expand(info, okm),
        HashAlgorithm::Blake3 => return Err(AgreementError::UnsupportedHash(hash)),
    };
    expanded.map_err(|_| AgreementError::OutputTooLong {
        kdf: "hkdf",
        hash,
        max: 255 * hash.digest_len(),
        requested: okm.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::asymmetric::{EcdhP256, Ed25519, X25519};

    fn both_sides<A: AsymmetricAlgorithm>(params: &AgreementParameters, len: usize) -> (SecretBytes, SecretBytes) {
        let alice = KeyPair::<A>::generate().unwrap();
        let bob = KeyPair::<A>::generate().unwrap();
        let alice_pub = params.export_public(&alice).unwrap();
        let bob_pub = params.export_public(&bob).unwrap();
        (
            params.derive_key(&alice, &bob_pub, len).unwrap(),
            params.derive_key(&bob, &alice_pub, len).unwrap(),
        )
    }

    #[test]
    fn test_default_is_sha256_hash_spki() {
        let params = AgreementParameters::default();
        assert_eq!(params.hash, HashAlgorithm::Sha256);
        assert_eq!(params.kdf.name(), "hash");
        assert_eq!(params.public_key_format, PublicKeyFormat::SubjectPublicKeyInfo);
    }

    #[test]
    fn test_every_kdf_agrees_p256() {
        let kdfs = [
            KeyDerivation::default(),
            KeyDerivation::Hash {
                prepend: b"pre".to_vec(),
                append: b"post".to_vec(),
            },
            KeyDerivation::Hmac { key: Vec::new() },
            KeyDerivation::Hmac {
                key: b"hmac key".to_vec(),
            },
            KeyDerivation::Hkdf {
                salt: b"salt".to_vec(),
                info: b"strongbox test".to_vec(),
            },
        ];
        for kdf in kdfs {
            for format in [PublicKeyFormat::SubjectPublicKeyInfo, PublicKeyFormat::Raw] {
                let params = AgreementParameters::new(HashAlgorithm::Sha384, kdf.clone(), format);
                let (a, b) = both_sides::<EcdhP256>(&params, 32);
                assert_eq!(a.as_slice(), b.as_slice(), "{} / {:?}", kdf.name(), format);
            }
        }
    }

    #[test]
    fn test_x25519_raw_format() {
        let params = AgreementParameters::new(
            HashAlgorithm::Blake3,
            KeyDerivation::default(),
            PublicKeyFormat::Raw,
        );
        let (a, b) = both_sides::<X25519>(&params, 16);
        assert_eq!(a.len(), 16);
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_hash_kdf_matches_manual_computation() {
        let z = [7u8; 32];
        let params = AgreementParameters::new(
            HashAlgorithm::Sha256,
            KeyDerivation::Hash {
                prepend: b"A".to_vec(),
                append: b"B".to_vec(),
            },
            PublicKeyFormat::Raw,
        );
        let mut manual = b"A".to_vec();
        manual.extend_from_slice(&z);
        manual.extend_from_slice(b"B");
        assert_eq!(
            params.apply_kdf(&z, 32).unwrap().as_slice(),
            HashAlgorithm::Sha256.compute(&manual).as_slice()
        );
    }

    #[test]
    fn test_different_parameters_different_keys() {
        let alice = KeyPair::<X25519>::generate().unwrap();
        let bob = KeyPair::<X25519>::generate().unwrap();
        let bob_pub = bob.public_key().export().unwrap();

        let plain = AgreementParameters::default();
        let salted = AgreementParameters::hkdf(HashAlgorithm::Sha256, b"salt", b"info");
        assert_ne!(
            plain.derive_key(&alice, &bob_pub, 32).unwrap().as_slice(),
            salted.derive_key(&alice, &bob_pub, 32).unwrap().as_slice()
        );
    }

    #[test]
    fn test_output_length_limits() {
        let z = [1u8; 32];
        let plain = AgreementParameters::default();
        assert!(matches!(
            plain.apply_kdf(&z, 33),
            Err(AgreementError::OutputTooLong { max: 32, .. })
        ));
        assert!(matches!(plain.apply_kdf(&z, 0), Err(AgreementError::EmptyOutput)));

        // HKDF can stretch.
        let hkdf = AgreementParameters::hkdf(HashAlgorithm::Sha256, b"", b"");
        assert_eq!(hkdf.apply_kdf(&z, 100).unwrap().len(), 100);
        assert!(hkdf.apply_kdf(&z, 255 * 32 + 1).is_err());

        let blake_hkdf = AgreementParameters::hkdf(HashAlgorithm::Blake3, b"", b"");
        assert!(matches!(
            blake_hkdf.apply_kdf(&z, 32),
            Err(AgreementError::UnsupportedHash(HashAlgorithm::Blake3))
        ));
    }

    #[test]
    fn test_rfc5869_case_1() {
        let ikm = [0x0bu8; 22];
        let salt = hex::decode("000102030405060708090a0b0c").unwrap();
        let info = hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap();
        let params = AgreementParameters::hkdf(HashAlgorithm::Sha256, &salt, &info);
        assert_eq!(
            hex::encode(params.apply_kdf(&ikm, 42).unwrap().as_slice()),
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
        );
    }

    #[test]
    fn test_signature_algorithm_cannot_agree() {
        let params = AgreementParameters::default();
        let alice = KeyPair::<Ed25519>::generate().unwrap();
        let bob = KeyPair::<Ed25519>::generate().unwrap();
        let bob_pub = params.export_public(&bob).unwrap();
        assert!(matches!(
            params.derive_key(&alice, &bob_pub, 32),
            Err(AgreementError::Key(AsymmetricError::Unsupported { .. }))
        ));
    }

    #[test]
    fn test_bad_remote_key() {
        let params = AgreementParameters::default();
        let alice = KeyPair::<EcdhP256>::generate().unwrap();
        assert!(matches!(
            params.derive_key(&alice, b"garbage", 32),
            Err(AgreementError::Key(AsymmetricError::InvalidPublicKey))
        ));
    }

    #[test]
    fn test_parameters_serialize() {
        let params = AgreementParameters::new(
            HashAlgorithm::Sha512,
            KeyDerivation::Hkdf {
                salt: vec![1, 2, 3],
                info: b"ctx".to_vec(),
            },
            PublicKeyFormat::Raw,
        );
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"sha512\""));
        assert!(json.contains("\"hkdf\""));
        let back: AgreementParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);

        // Missing fields fall back to the defaults.
        let minimal: AgreementParameters = serde_json::from_str("{}").unwrap();
        assert_eq!(minimal, AgreementParameters::default());
    }
}
