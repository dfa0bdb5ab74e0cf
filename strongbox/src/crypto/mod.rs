//! # Cryptographic Primitives
//!
//! Everything in Strongbox lives under this module. Every hash, every
//! encrypted payload, every signature flows through here on its way to a
//! crate somebody else audited.
//!
//! We deliberately chose boring, well-audited cryptography:
//!
//! - **RSA** (OAEP / PKCS#1 v1.5) for the people who still need it.
//! - **P-256** for ECDH and ECDSA, because the NIST curves are what
//!   everyone's HSM speaks.
//! - **Ed25519 / X25519** for everyone else.
//! - **AES-GCM** for symmetric encryption. AEAD done right.
//! - **SHA-1/2** and **BLAKE3** for hashing.
//! - **PBKDF2 / Argon2id** for turning passwords into keys.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. The only local logic is [`constant_time`] and [`wipe`];
//! everything else is a thin, type-safe wrapper. If you're tempted to
//! optimize these functions, please reconsider. Then reconsider again.
//! Then go read about timing attacks and come back when you've lost the
//! urge.

pub mod agreement;
pub mod asymmetric;
pub mod constant_time;
pub mod encoding;
pub mod hash;
pub mod keywrap;
pub mod signatures;
pub mod symmetric;
pub mod wipe;

// Re-export the things people actually need so they don't have to memorize
// our module hierarchy. Life's too short for five levels of `use` statements.
pub use agreement::{AgreementParameters, KeyDerivation, PublicKeyFormat};
pub use asymmetric::{AsymmetricAlgorithm, AsymmetricError, KeyPair, PublicKey};
pub use constant_time::ct_eq;
pub use encoding::{Encoding, HexCase};
pub use hash::{blake3_hash, double_sha256, sha256, HashAlgorithm};
pub use keywrap::{unwrap_key, wrap_key, WrappedKey};
pub use signatures::{sign_hashed, verify_hashed};
pub use symmetric::{decrypt, encrypt, Aes128GcmCipher, Aes256GcmCipher, SymmetricCipher};
pub use wipe::{wipe_bytes, wipe_ints, wipe_strings, SecretBytes};
