//! # CLI Configuration File
//!
//! Optional JSON file holding the defaults people get tired of typing:
//! key-wrapping KDF and cost, and agreement parameters.
//!
//! ```json
//! {
//!   "wrap": { "kdf": { "kdf": "argon2id", "memory_kib": 65536, "iterations": 3, "parallelism": 1 } },
//!   "agreement": { "hash": "sha384", "kdf": { "type": "hkdf", "info": "c3Ryb25nYm94" } }
//! }
//! ```
//!
//! Missing fields fall back to library defaults. Unknown fields are an
//! error, so a typo doesn't silently drop you back to the defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use strongbox::config::{KdfParams, WrapParams};
use strongbox::crypto::keywrap::validate_params;
use strongbox::crypto::AgreementParameters;

use crate::cli::KdfChoice;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub wrap: WrapParams,
    pub agreement: AgreementParameters,
}

impl CliConfig {
    /// Load from `path`, or defaults when there is no file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        validate_params(&config.wrap.kdf)
            .with_context(|| format!("unusable KDF settings in {}", path.display()))?;
        tracing::debug!(path = %path.display(), kdf = config.wrap.kdf.name(), "loaded config");
        Ok(config)
    }

    /// Wrap parameters after applying command-line overrides.
    pub fn wrap_params(&self, kdf: Option<KdfChoice>, iterations: Option<u32>) -> WrapParams {
        let mut params = self.wrap;
        match kdf {
            Some(KdfChoice::Pbkdf2) if !matches!(params.kdf, KdfParams::Pbkdf2 { .. }) => {
                params.kdf = KdfParams::pbkdf2();
            }
            Some(KdfChoice::Argon2id) if !matches!(params.kdf, KdfParams::Argon2id { .. }) => {
                params.kdf = KdfParams::argon2id();
            }
            _ => {}
        }
        if let Some(count) = iterations {
            match &mut params.kdf {
                KdfParams::Pbkdf2 { iterations } => *iterations = count,
                KdfParams::Argon2id { iterations, .. } => *iterations = count,
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use strongbox::crypto::HashAlgorithm;

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn loads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "agreement": {{ "hash": "sha512" }}, "wrap": {{ "kdf": {{ "kdf": "pbkdf2", "iterations": 20000 }} }} }}"#
        )
        .unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.agreement.hash, HashAlgorithm::Sha512);
        assert_eq!(config.wrap.kdf, KdfParams::Pbkdf2 { iterations: 20_000 });
    }

    #[test]
    fn rejects_typos_and_weak_settings() {
        let mut typo = tempfile::NamedTempFile::new().unwrap();
        write!(typo, r#"{{ "wrapp": {{}} }}"#).unwrap();
        assert!(CliConfig::load(Some(typo.path())).is_err());

        let mut weak = tempfile::NamedTempFile::new().unwrap();
        write!(weak, r#"{{ "wrap": {{ "kdf": {{ "kdf": "pbkdf2", "iterations": 5 }} }} }}"#).unwrap();
        assert!(CliConfig::load(Some(weak.path())).is_err());
    }

    #[test]
    fn overrides_apply() {
        let config = CliConfig::default();
        let params = config.wrap_params(Some(KdfChoice::Argon2id), Some(4));
        assert!(matches!(params.kdf, KdfParams::Argon2id { iterations: 4, .. }));

        let params = config.wrap_params(None, Some(50_000));
        assert_eq!(params.kdf, KdfParams::Pbkdf2 { iterations: 50_000 });
    }
}
