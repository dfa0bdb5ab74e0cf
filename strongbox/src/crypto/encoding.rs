//! # Text Encodings
//!
//! Bytes in, text out, and back again. Hex (either case), base64 (standard
//! and URL-safe), and base58 for the humans who have to read keys aloud.
//!
//! Nothing here is secret-aware: if you hex-encode a private key, the
//! resulting `String` is just as sensitive as the key and will not wipe
//! itself. Wrap it in `Zeroizing` or, better, don't do that.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from decoding text back into bytes.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid base58: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("raw bytes have no text representation")]
    NotText,

    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),
}

/// Letter case for hex output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexCase {
    #[default]
    Lower,
    Upper,
}

/// Hex-encode `data` in the requested case.
pub fn to_hex(data: &[u8], case: HexCase) -> String {
    match case {
        HexCase::Lower => hex::encode(data),
        HexCase::Upper => hex::encode_upper(data),
    }
}

/// Decode hex in either case (mixed case is accepted too).
pub fn from_hex(s: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(hex::decode(s.trim())?)
}

/// Standard-alphabet, padded base64.
pub fn to_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard-alphabet, padded base64.
pub fn from_base64(s: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(STANDARD.decode(s.trim())?)
}

/// URL-safe base64 without padding. What JOSE and most web APIs want.
pub fn to_base64_url(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode URL-safe, unpadded base64.
pub fn from_base64_url(s: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(URL_SAFE_NO_PAD.decode(s.trim())?)
}

/// Bitcoin-alphabet base58.
pub fn to_base58(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decode Bitcoin-alphabet base58.
pub fn from_base58(s: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(bs58::decode(s.trim()).into_vec()?)
}

/// The encodings a caller can ask for by name.
///
/// `Raw` exists so that APIs (and the CLI) can say "give me the bytes
/// untouched"; asking it for text is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Raw,
    Base64,
    Base64Url,
    Hex(HexCase),
    Base58,
}

impl Encoding {
    /// Encode bytes as text.
    pub fn encode(&self, data: &[u8]) -> Result<String, EncodingError> {
        match self {
            Encoding::Raw => Err(EncodingError::NotText),
            Encoding::Base64 => Ok(to_base64(data)),
            Encoding::Base64Url => Ok(to_base64_url(data)),
            Encoding::Hex(case) => Ok(to_hex(data, *case)),
            Encoding::Base58 => Ok(to_base58(data)),
        }
    }

    /// Decode text back to bytes.
    pub fn decode(&self, s: &str) -> Result<Vec<u8>, EncodingError> {
        match self {
            Encoding::Raw => Err(EncodingError::NotText),
            Encoding::Base64 => from_base64(s),
            Encoding::Base64Url => from_base64_url(s),
            Encoding::Hex(_) => from_hex(s),
            Encoding::Base58 => from_base58(s),
        }
    }

    /// Encode to owned bytes, passing raw data through.
    ///
    /// This is the variant file writers want: raw stays raw, everything
    /// else becomes UTF-8 text.
    pub fn encode_bytes(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Encoding::Raw => data.to_vec(),
            other => other
                .encode(data)
                .map(String::into_bytes)
                .unwrap_or_default(),
        }
    }

    /// Inverse of [`encode_bytes`](Self::encode_bytes).
    pub fn decode_bytes(&self, data: &[u8]) -> Result<Vec<u8>, EncodingError> {
        match self {
            Encoding::Raw => Ok(data.to_vec()),
            other => other.decode(&String::from_utf8_lossy(data)),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Raw => "raw",
            Encoding::Base64 => "base64",
            Encoding::Base64Url => "base64url",
            Encoding::Hex(HexCase::Lower) => "hex",
            Encoding::Hex(HexCase::Upper) => "HEX",
            Encoding::Base58 => "base58",
        };
        f.write_str(name)
    }
}

impl FromStr for Encoding {
    type Err = EncodingError;

    /// `hex` is lowercase, `HEX` (or `hex-upper`) is uppercase. Everything
    /// else is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HEX" | "hex-upper" => return Ok(Encoding::Hex(HexCase::Upper)),
            "hex" | "hex-lower" => return Ok(Encoding::Hex(HexCase::Lower)),
            _ => {}
        }
        match s.to_lowercase().as_str() {
            "raw" | "bin" => Ok(Encoding::Raw),
            "base64" | "b64" => Ok(Encoding::Base64),
            "base64url" | "b64url" => Ok(Encoding::Base64Url),
            "base58" | "b58" => Ok(Encoding::Base58),
            "hex" => Ok(Encoding::Hex(HexCase::Lower)),
            _ => Err(EncodingError::UnknownEncoding(s.to_string())),
        }
    }
}

/// serde adapter for `Vec<u8>` fields stored as standard base64 strings.
///
/// ```ignore
/// #[serde(with = "crate::crypto::encoding::serde_base64")]
/// pub salt: Vec<u8>,
/// ```
pub mod serde_base64 {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{from_base64, to_base64};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_base64(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        from_base64(&text).map_err(serde::de::Error::custom)
    }
}
