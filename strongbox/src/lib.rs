// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Strongbox — Core Library
//!
//! A typed convenience layer over the RustCrypto and dalek crates. Strongbox
//! implements no cryptographic algorithm of its own: key generation,
//! hashing, encryption, signatures and key agreement are all delegated.
//! What it adds is one consistent API across the backends, plus the glue
//! everyone ends up writing anyway.
//!
//! ## Modules
//!
//! - **crypto::constant_time** — byte comparison without early exit.
//! - **crypto::wipe** — zeroing buffers that held secrets.
//! - **crypto::encoding** — hex (either case), base64, base58.
//! - **crypto::hash** — SHA-1/2 and BLAKE3 behind one enum.
//! - **crypto::symmetric** — AES-GCM, generic over the AEAD.
//! - **crypto::asymmetric** — RSA, P-256, Ed25519, X25519 behind one trait.
//! - **crypto::signatures** — hash-then-sign and batch verification.
//! - **crypto::keywrap** — password-wrapped private keys.
//! - **crypto::agreement** — turning a DH output into a key.
//! - **config** — constants and KDF tunables.
//!
//! ## Design Philosophy
//!
//! 1. Delegate the math. Wrap it in types that make misuse a compile error.
//! 2. Unsupported operations are errors, never panics, never no-ops.
//! 3. Secrets zeroize on drop. Debug output never contains them.
//! 4. Error messages say *that* something failed, not *why* a secret was wrong.

pub mod config;
pub mod crypto;
