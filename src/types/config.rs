//! Configuration for memokit.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::key::{KeyDigest, StructuralKey};
use crate::{MemoError, MemoResult};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "memokit.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];

/// Main configuration for memokit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Cache key settings.
    #[serde(default)]
    pub keys: KeysConfig,
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Cache key settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Final form of structural keys (canonical, sha256).
    #[serde(default)]
    pub digest: KeyDigest,
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> MemoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> MemoResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Checks values serde cannot check on its own.
    pub fn validate(&self) -> MemoResult<()> {
        if !LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(MemoError::config(format!(
                "unknown log_level '{}' (expected one of: {})",
                self.general.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if !LOG_FORMATS.contains(&self.general.log_format.as_str()) {
            return Err(MemoError::config(format!(
                "unknown log_format '{}' (expected one of: {})",
                self.general.log_format,
                LOG_FORMATS.join(", ")
            )));
        }

        Ok(())
    }

    /// Key strategy described by `[keys]`.
    pub fn key_strategy(&self) -> StructuralKey {
        StructuralKey::new(self.keys.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.keys.digest, KeyDigest::Canonical);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default_config();
        config.keys.digest = KeyDigest::Sha256;
        config.general.log_format = "json".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.key_strategy().digest(), KeyDigest::Sha256);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[keys]\ndigest = \"sha256\"\n").unwrap();
        assert_eq!(config.keys.digest, KeyDigest::Sha256);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[general]\nlog_format = \"xml\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, MemoError::Config(_)));
    }

    #[test]
    fn test_unknown_digest_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[keys]\ndigest = \"md5\"\n").unwrap();

        assert!(matches!(Config::load(&path), Err(MemoError::TomlParse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(MemoError::Io(_))));
    }
}
