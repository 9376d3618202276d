//! # Codec Configuration
//!
//! Tunables for building generations. Every key is optional; unknown keys are
//! rejected so that typos do not silently fall back to defaults.
//!
//! ```yaml
//! eager-prime: true
//! strict-children: false
//! path-cache-capacity: 1024
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration applied to every generation a manager builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CodecConfig {
    /// Build every reachable context when a generation is built, so schema
    /// mismatches are reported before the generation is published.
    pub eager_prime: bool,
    /// Reject unknown normalized children and undeclared typed fields instead
    /// of skipping them.
    pub strict_children: bool,
    /// Maximum memoized typed-path translations per generation. Zero disables
    /// the cache.
    pub path_cache_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            eager_prime: true,
            strict_children: false,
            path_cache_capacity: 1024,
        }
    }
}

impl CodecConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = CodecConfig::from_yaml_str("strict-children: true").unwrap();
        assert!(config.strict_children);
        assert!(config.eager_prime);
        assert_eq!(config.path_cache_capacity, 1024);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CodecConfig::from_yaml_str("eager_prime: false").is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codec.yaml");
        std::fs::write(&path, "path-cache-capacity: 0\neager-prime: false\n").unwrap();
        let config = CodecConfig::load(&path).unwrap();
        assert_eq!(config.path_cache_capacity, 0);
        assert!(!config.eager_prime);
    }
}
