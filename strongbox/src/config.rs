//! # Constants & Tunables
//!
//! Every magic number in Strongbox lives here. If you're hardcoding a key
//! length somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! Most of these are dictated by the algorithms we wrap, not chosen by us.
//! The ones we *did* choose (KDF costs, envelope version) are the ones worth
//! arguing about in review.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Symmetric Parameters
// ---------------------------------------------------------------------------

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-128-GCM key length in bytes.
pub const AES128_KEY_LENGTH: usize = 16;

/// AES-GCM nonce length in bytes. 96 bits. Not 128. Not 64. Twelve bytes.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

// ---------------------------------------------------------------------------
// Asymmetric Parameters
// ---------------------------------------------------------------------------

/// Default RSA modulus size. 2048 bits is the floor, not the ceiling.
pub const DEFAULT_RSA_BITS: usize = 2048;

/// Ed25519 signature length.
pub const ED25519_SIGNATURE_LENGTH: usize = 64;

/// Raw X25519 key length (public and private).
pub const X25519_KEY_LENGTH: usize = 32;

/// Fixed-size (r || s) ECDSA P-256 signature length.
pub const P256_SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Output length of SHA-256 and BLAKE3.
pub const HASH_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Password-Based Key Wrapping
// ---------------------------------------------------------------------------

/// Current version of the wrapped-key envelope. Bump when the envelope
/// layout or the AAD construction changes.
pub const WRAP_ENVELOPE_VERSION: u8 = 1;

/// Salt length for password-based key derivation. 16 bytes per NIST
/// SP 800-132's recommendation of "at least 128 bits".
pub const KDF_SALT_LENGTH: usize = 16;

/// Default PBKDF2-HMAC-SHA256 iteration count (OWASP 2023 guidance).
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;

/// Anything below this is refused outright. Tests that need speed use this
/// exact value.
pub const MIN_PBKDF2_ITERATIONS: u32 = 10_000;

/// Default Argon2id memory cost in KiB (19 MiB, OWASP minimum).
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19 * 1024;

/// Default Argon2id pass count.
pub const DEFAULT_ARGON2_ITERATIONS: u32 = 2;

/// Default Argon2id lane count.
pub const DEFAULT_ARGON2_PARALLELISM: u32 = 1;

// KDF costs come out of envelope JSON, so they get a ceiling as well as a
// floor. Checked before any derivation work starts.

/// PBKDF2 iteration ceiling. Roughly ten seconds on a laptop.
pub const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

/// Argon2id memory ceiling in KiB (1 GiB).
pub const MAX_ARGON2_MEMORY_KIB: u32 = 1024 * 1024;

/// Argon2id pass ceiling.
pub const MAX_ARGON2_ITERATIONS: u32 = 64;

/// Argon2id lane ceiling.
pub const MAX_ARGON2_PARALLELISM: u32 = 16;

/// Which password KDF to run, and how hard.
///
/// Stored verbatim in every wrapped-key envelope so that unwrapping never has
/// to guess. Changing the defaults above does not break old envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kdf", rename_all = "lowercase")]
pub enum KdfParams {
    /// PBKDF2 with HMAC-SHA256.
    Pbkdf2 {
        /// Iteration count.
        iterations: u32,
    },
    /// Argon2id (RFC 9106), version 0x13.
    Argon2id {
        /// Memory cost in KiB.
        memory_kib: u32,
        /// Number of passes.
        iterations: u32,
        /// Degree of parallelism.
        parallelism: u32,
    },
}

impl KdfParams {
    /// PBKDF2 at the default iteration count.
    pub fn pbkdf2() -> Self {
        KdfParams::Pbkdf2 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }

    /// Argon2id with default costs.
    pub fn argon2id() -> Self {
        KdfParams::Argon2id {
            memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            iterations: DEFAULT_ARGON2_ITERATIONS,
            parallelism: DEFAULT_ARGON2_PARALLELISM,
        }
    }

    /// Short label for logging.
    pub fn name(&self) -> &'static str {
        match self {
            KdfParams::Pbkdf2 { .. } => "pbkdf2-sha256",
            KdfParams::Argon2id { .. } => "argon2id",
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::pbkdf2()
    }
}

/// Runtime parameters for password-based key wrapping.
///
/// Deliberately tiny. The envelope format is fixed; only the KDF and its
/// cost are negotiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WrapParams {
    /// Password KDF and cost.
    pub kdf: KdfParams,
}

impl WrapParams {
    /// Cheapest parameters that still pass validation. Test use only —
    /// please don't ship this.
    pub fn fast_insecure() -> Self {
        Self {
            kdf: KdfParams::Pbkdf2 {
                iterations: MIN_PBKDF2_ITERATIONS,
            },
        }
    }
}
