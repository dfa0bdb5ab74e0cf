//! # Hashing Façade
//!
//! One enum, five hash functions, zero opinions about which one you should
//! have picked:
//!
//! - **SHA-1** — legacy interop only. Broken for collisions since 2017.
//!   It's here because someone, somewhere, still signs with it.
//! - **SHA-256 / SHA-384 / SHA-512** — the FIPS family everyone expects.
//! - **BLAKE3** — fast everywhere, and the one we'd pick if nobody else
//!   had an opinion.
//!
//! [`HashAlgorithm`] is the runtime-selectable form (CLI flags, agreement
//! parameters, config files). [`Hasher`] is the compile-time generic form
//! for callers that know their digest type and want streaming updates.

use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use thiserror::Error;

use super::constant_time::ct_eq;

/// Errors from keyed hashing and algorithm lookup.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid MAC key length for {algorithm}")]
    InvalidKeyLength { algorithm: HashAlgorithm },

    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// A runtime-selectable hash function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Blake3,
}

impl HashAlgorithm {
    /// Every supported algorithm, in a stable order.
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
        HashAlgorithm::Blake3,
    ];

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 | HashAlgorithm::Blake3 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Hash `data` in one shot.
    ///
    /// # Example
    ///
    /// ```
    /// use strongbox::crypto::HashAlgorithm;
    ///
    /// let digest = HashAlgorithm::Sha384.compute(b"strongbox");
    /// assert_eq!(digest.len(), 48);
    /// ```
    pub fn compute(&self, data: &[u8]) -> Vec<u8> {
        self.compute_multi(&[data])
    }

    /// Hash several slices as if they had been concatenated, without
    /// allocating the concatenation.
    pub fn compute_multi(&self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => digest_parts::<Sha1>(parts),
            HashAlgorithm::Sha256 => digest_parts::<Sha256>(parts),
            HashAlgorithm::Sha384 => digest_parts::<Sha384>(parts),
            HashAlgorithm::Sha512 => digest_parts::<Sha512>(parts),
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                for part in parts {
                    hasher.update(part);
                }
                hasher.finalize().as_bytes().to_vec()
            }
        }
    }

    /// Keyed hash: HMAC for the SHA family, BLAKE3's native keyed mode for
    /// BLAKE3.
    ///
    /// HMAC accepts keys of any length. BLAKE3 keyed mode wants exactly 32
    /// bytes and we refuse to silently pad or hash a key for it.
    pub fn hmac(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, HashError> {
        match self {
            HashAlgorithm::Sha1 => mac::<Hmac<Sha1>>(*self, key, data),
            HashAlgorithm::Sha256 => mac::<Hmac<Sha256>>(*self, key, data),
            HashAlgorithm::Sha384 => mac::<Hmac<Sha384>>(*self, key, data),
            HashAlgorithm::Sha512 => mac::<Hmac<Sha512>>(*self, key, data),
            HashAlgorithm::Blake3 => {
                let key: &[u8; 32] = key
                    .try_into()
                    .map_err(|_| HashError::InvalidKeyLength { algorithm: *self })?;
                Ok(blake3::keyed_hash(key, data).as_bytes().to_vec())
            }
        }
    }

    /// Recompute the digest of `data` and compare it to `expected` in
    /// constant time.
    pub fn verify_digest(&self, data: &[u8], expected: &[u8]) -> bool {
        ct_eq(&self.compute(data), expected)
    }

    /// Recompute a keyed hash and compare it in constant time. A bad key
    /// length counts as a mismatch.
    pub fn verify_hmac(&self, key: &[u8], data: &[u8], expected: &[u8]) -> bool {
        match self.hmac(key, data) {
            Ok(tag) => ct_eq(&tag, expected),
            Err(_) => false,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            "blake3" => Ok(HashAlgorithm::Blake3),
            _ => Err(HashError::UnknownAlgorithm(s.to_string())),
        }
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

fn mac<M: Mac + KeyInit>(
    algorithm: HashAlgorithm,
    key: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, HashError> {
    let mut mac = <M as KeyInit>::new_from_slice(key)
        .map_err(|_| HashError::InvalidKeyLength { algorithm })?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Streaming hasher generic over any RustCrypto digest.
///
/// ```
/// use sha2::Sha256;
/// use strongbox::crypto::hash::Hasher;
///
/// let mut h = Hasher::<Sha256>::new();
/// h.update(b"strong").update(b"box");
/// assert_eq!(h.finalize(), strongbox::crypto::sha256(b"strongbox"));
/// ```
#[derive(Clone, Default)]
pub struct Hasher<D: Digest> {
    inner: D,
}

impl<D: Digest> Hasher<D> {
    pub fn new() -> Self {
        Self { inner: D::new() }
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        Digest::update(&mut self.inner, data);
        self
    }

    pub fn finalize(self) -> Vec<u8> {
        self.inner.finalize().to_vec()
    }

    /// Digest length of `D` in bytes.
    pub fn output_len() -> usize {
        <D as Digest>::output_size()
    }
}

/// SHA-256 of `data` as a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use strongbox::crypto::sha256;
///
/// assert_eq!(sha256(b"").len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    HashAlgorithm::Sha256.compute(data)
}

/// SHA-256 as a fixed-size array, for callers that want the length in the
/// type.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// BLAKE3 of `data` as a fixed-size array.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// BLAKE3 in `derive_key` mode with a context string.
///
/// Same data, different context, unrelated outputs. Use a context string
/// that names the application and purpose, e.g.
/// `"strongbox 2026 agreement confirmation"`.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_sha1_known_vector() {
        let hash = HashAlgorithm::Sha1.compute(b"abc");
        assert_eq!(hex::encode(hash), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_sha512_known_vector() {
        let hash = HashAlgorithm::Sha512.compute(b"abc");
        assert_eq!(
            hex::encode(hash),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_digest_lengths_match_output() {
        for alg in HashAlgorithm::ALL {
            assert_eq!(alg.compute(b"x").len(), alg.digest_len(), "{alg}");
        }
    }

    #[test]
    fn test_compute_multi_equals_concatenation() {
        for alg in HashAlgorithm::ALL {
            let multi = alg.compute_multi(&[b"hello", b" ", b"world"]);
            assert_eq!(multi, alg.compute(b"hello world"), "{alg}");
        }
    }

    #[test]
    fn test_sha256_array_matches_vec() {
        assert_eq!(sha256(b"test data").as_slice(), sha256_array(b"test data").as_slice());
    }

    #[test]
    fn test_blake3_matches_enum() {
        assert_eq!(
            blake3_hash(b"strongbox").to_vec(),
            HashAlgorithm::Blake3.compute(b"strongbox")
        );
    }

    #[test]
    fn double_sha256_differs_from_single() {
        let single = sha256(b"strongbox");
        let double = double_sha256(b"strongbox");
        assert_ne!(single, double);
        assert_eq!(double, sha256(&single));
    }

    #[test]
    fn test_hmac_rfc4231_case_2() {
        // RFC 4231 test case 2: key = "Jefe".
        let tag = HashAlgorithm::Sha256
            .hmac(b"Jefe", b"what do ya want for nothing?")
            .unwrap();
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_blake3_keyed_requires_32_byte_key() {
        assert!(HashAlgorithm::Blake3.hmac(&[0u8; 16], b"data").is_err());
        let tag = HashAlgorithm::Blake3.hmac(&[0u8; 32], b"data").unwrap();
        assert_eq!(tag.len(), 32);
    }

    #[test]
    fn test_verify_digest() {
        let digest = HashAlgorithm::Sha384.compute(b"payload");
        assert!(HashAlgorithm::Sha384.verify_digest(b"payload", &digest));
        assert!(!HashAlgorithm::Sha384.verify_digest(b"Payload", &digest));
        assert!(!HashAlgorithm::Sha256.verify_digest(b"payload", &digest));
    }

    #[test]
    fn test_verify_hmac() {
        let tag = HashAlgorithm::Sha512.hmac(b"k", b"m").unwrap();
        assert!(HashAlgorithm::Sha512.verify_hmac(b"k", b"m", &tag));
        assert!(!HashAlgorithm::Sha512.verify_hmac(b"K", b"m", &tag));
        assert!(!HashAlgorithm::Blake3.verify_hmac(b"short", b"m", &tag));
    }

    #[test]
    fn test_parse_algorithm_names() {
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("blake3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_streaming_hasher() {
        let mut h = Hasher::<Sha512>::new();
        h.update(b"a").update(b"bc");
        assert_eq!(h.finalize(), HashAlgorithm::Sha512.compute(b"abc"));
        assert_eq!(Hasher::<Sha384>::output_len(), 48);
    }

    #[test]
    fn test_domain_separation() {
        let data = b"same data";
        assert_ne!(
            domain_separated_hash("context-a", data),
            domain_separated_hash("context-b", data)
        );
        assert_ne!(domain_separated_hash("context-a", data), blake3_hash(data));
    }
}
