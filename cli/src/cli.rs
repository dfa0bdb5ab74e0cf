//! # CLI Interface
//!
//! Defines the command-line argument structure for `strongbox` using
//! `clap` derive. Every subcommand is a thin shell over one library
//! operation; the interesting code is in `commands.rs`.
//!
//! Anything secret (passwords, AES keys) can come from the environment so
//! that it doesn't end up in shell history.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use strongbox::crypto::{Encoding, HashAlgorithm};

/// Strongbox crypto toolkit.
///
/// Hashing, signing, encryption and key agreement over audited backends,
/// with password-wrapped private keys.
#[derive(Parser, Debug)]
#[command(
    name = "strongbox",
    about = "Strongbox crypto toolkit",
    version,
    propagate_version = true
)]
pub struct StrongboxCli {
    /// JSON config file with default key-wrapping and agreement parameters.
    #[arg(long, short = 'c', global = true, env = "STRONGBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "STRONGBOX_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Log format: `pretty` or `json`. Logs always go to stderr.
    #[arg(long, global = true, env = "STRONGBOX_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash (or HMAC) a file or stdin.
    Hash(HashArgs),
    /// Generate a key pair.
    Keygen(KeygenArgs),
    /// Print the public half of a private key file.
    Pubkey(PubkeyArgs),
    /// Hash a message, then sign the digest.
    Sign(SignArgs),
    /// Verify a signature produced by `sign`.
    Verify(VerifyArgs),
    /// AES-256-GCM encrypt a file or stdin.
    Encrypt(CryptArgs),
    /// AES-256-GCM decrypt a file or stdin.
    Decrypt(CryptArgs),
    /// Compare two encoded values in constant time.
    Compare(CompareArgs),
    /// Derive a shared key from our private key and a peer's public key.
    Agree(AgreeArgs),
    /// Print version information and exit.
    Version,
}

/// Key-pair algorithms selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyAlgorithm {
    Rsa2048,
    Rsa3072,
    Rsa4096,
    EcdhP256,
    EcdsaP256,
    Ed25519,
    X25519,
}

/// Password KDF override for wrapped keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KdfChoice {
    Pbkdf2,
    Argon2id,
}

/// Where a private key comes from, and how to open it.
#[derive(Args, Debug, Clone)]
pub struct PrivateKeyArgs {
    /// Private key file: a wrapped-key JSON envelope or encoded PKCS#8/raw key.
    #[arg(long, short = 'k')]
    pub key: PathBuf,

    /// Encoding of an unwrapped key file.
    #[arg(long, default_value = "base64")]
    pub key_encoding: Encoding,

    /// Password for a wrapped key file.
    #[arg(long, env = "STRONGBOX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the `hash` subcommand.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Hash algorithm: sha1, sha256, sha384, sha512 or blake3.
    #[arg(long, short = 'a', default_value = "sha256")]
    pub algorithm: HashAlgorithm,

    /// Output encoding.
    #[arg(long, short = 'e', default_value = "hex")]
    pub encoding: Encoding,

    /// Hex-encoded key. Computes an HMAC (keyed BLAKE3 for blake3) instead.
    #[arg(long, env = "STRONGBOX_HMAC_KEY", hide_env_values = true)]
    pub hmac_key: Option<String>,
}

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key algorithm.
    #[arg(long, short = 'a', value_enum, default_value_t = KeyAlgorithm::Ed25519)]
    pub algorithm: KeyAlgorithm,

    /// Where to write the private key.
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    /// Where to write the public key. Stdout when omitted.
    #[arg(long)]
    pub pub_out: Option<PathBuf>,

    /// Encoding for an unwrapped private key and for the public key.
    #[arg(long, short = 'e', default_value = "base64")]
    pub encoding: Encoding,

    /// Wrap the private key under this password (JSON envelope output).
    #[arg(long, env = "STRONGBOX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Override the configured password KDF.
    #[arg(long, value_enum)]
    pub kdf: Option<KdfChoice>,

    /// Override the KDF iteration count.
    #[arg(long)]
    pub iterations: Option<u32>,
}

/// Arguments for the `pubkey` subcommand.
#[derive(Args, Debug)]
pub struct PubkeyArgs {
    #[arg(long, short = 'a', value_enum, default_value_t = KeyAlgorithm::Ed25519)]
    pub algorithm: KeyAlgorithm,

    #[command(flatten)]
    pub private: PrivateKeyArgs,

    /// Emit the compact point encoding instead of the native export.
    #[arg(long)]
    pub raw: bool,

    #[arg(long, short = 'e', default_value = "base64")]
    pub encoding: Encoding,
}

/// Arguments for the `sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    #[arg(long, short = 'a', value_enum, default_value_t = KeyAlgorithm::Ed25519)]
    pub algorithm: KeyAlgorithm,

    #[command(flatten)]
    pub private: PrivateKeyArgs,

    /// Hash applied to the message before signing.
    #[arg(long, default_value = "sha256")]
    pub hash: HashAlgorithm,

    /// Message file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Signature encoding.
    #[arg(long, short = 'e', default_value = "base64")]
    pub encoding: Encoding,

    /// Write the signature here instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[arg(long, short = 'a', value_enum, default_value_t = KeyAlgorithm::Ed25519)]
    pub algorithm: KeyAlgorithm,

    /// Public key file (native export format).
    #[arg(long, short = 'p')]
    pub pubkey: PathBuf,

    /// Signature file.
    #[arg(long, short = 's')]
    pub signature: PathBuf,

    /// Hash applied to the message before signing.
    #[arg(long, default_value = "sha256")]
    pub hash: HashAlgorithm,

    /// Message file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Encoding of both the public key and the signature files.
    #[arg(long, short = 'e', default_value = "base64")]
    pub encoding: Encoding,
}

/// Arguments for `encrypt` and `decrypt`.
#[derive(Args, Debug)]
pub struct CryptArgs {
    /// Hex-encoded 32-byte AES-256 key.
    #[arg(long, short = 'k', env = "STRONGBOX_AES_KEY", hide_env_values = true)]
    pub key: String,

    /// Input file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Output file. Writes stdout when omitted.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Ciphertext encoding (output of encrypt, input of decrypt).
    #[arg(long, short = 'e', default_value = "raw")]
    pub encoding: Encoding,
}

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    pub left: String,

    pub right: String,

    /// Encoding of both values.
    #[arg(long, short = 'e', default_value = "hex")]
    pub encoding: Encoding,
}

/// Arguments for the `agree` subcommand.
#[derive(Args, Debug)]
pub struct AgreeArgs {
    /// Agreement algorithm: ecdh-p256 or x25519.
    #[arg(long, short = 'a', value_enum, default_value_t = KeyAlgorithm::X25519)]
    pub algorithm: KeyAlgorithm,

    #[command(flatten)]
    pub private: PrivateKeyArgs,

    /// Peer public key file, in the configured public key format.
    #[arg(long)]
    pub peer: PathBuf,

    /// Encoding of the peer public key file.
    #[arg(long, default_value = "base64")]
    pub peer_encoding: Encoding,

    /// JSON agreement parameters. Overrides the config file.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Derived key length in bytes.
    #[arg(long, short = 'l', default_value_t = 32)]
    pub length: usize,

    /// Output encoding.
    #[arg(long, short = 'e', default_value = "hex")]
    pub encoding: Encoding,
}
