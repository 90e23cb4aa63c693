//! Configuration management for churchdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "churchdesk";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "records.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CHURCHDESK_`)
/// 2. TOML config file at `~/.config/churchdesk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Church profile.
    pub church: ChurchConfig,
    /// Export configuration.
    pub export: ExportConfig,
    /// Digital check-in configuration.
    pub checkin: CheckinConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/churchdesk/records.db`
    pub database_path: Option<PathBuf>,
}

/// General church details shown in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurchConfig {
    /// Church name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Street address.
    pub address: String,
    /// Public website.
    pub website: String,
    /// ISO 4217 currency code used when printing amounts.
    pub currency: String,
}

/// Export-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory CSV exports are written to.
    /// Defaults to the current working directory.
    pub directory: Option<PathBuf>,
}

/// Digital check-in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckinConfig {
    /// Base URL that check-in links are built on.
    pub base_url: String,
    /// Hours a generated check-in link stays valid.
    pub qr_expiration_hours: u32,
    /// Regenerate links automatically when they expire.
    pub auto_refresh: bool,
    /// Ask attendees to confirm their check-in.
    pub require_confirmation: bool,
}

impl Default for ChurchConfig {
    fn default() -> Self {
        Self {
            name: "Grace Community Church".to_string(),
            email: "info@gracechurch.org".to_string(),
            phone: "(555) 123-4567".to_string(),
            address: "123 Faith Street, Cityville, ST 12345".to_string(),
            website: "www.gracechurch.org".to_string(),
            currency: "NGN".to_string(),
        }
    }
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            base_url: "https://church.example.com".to_string(),
            qr_expiration_hours: 24,
            auto_refresh: true,
            require_confirmation: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CHURCHDESK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let currency = &self.church.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::ConfigValidation {
                message: format!("currency must be a three-letter ISO code, got '{currency}'"),
            });
        }

        let base_url = &self.checkin.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("checkin base_url must start with http:// or https://, got '{base_url}'"),
            });
        }

        if self.checkin.qr_expiration_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "qr_expiration_hours must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.export.directory.is_none());
        assert_eq!(config.church.currency, "NGN");
        assert!(config.checkin.auto_refresh);
        assert!(config.checkin.require_confirmation);
    }

    #[test]
    fn test_default_checkin_config() {
        let checkin = CheckinConfig::default();

        assert_eq!(checkin.base_url, "https://church.example.com");
        assert_eq!(checkin.qr_expiration_hours, 24);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_lowercase_currency() {
        let mut config = Config::default();
        config.church.currency = "ngn".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("currency"));
    }

    #[test]
    fn test_validate_long_currency() {
        let mut config = Config::default();
        config.church.currency = "NAIRA".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_base_url() {
        let mut config = Config::default();
        config.checkin.base_url = "church.example.com".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("base_url"));
    }

    #[test]
    fn test_validate_zero_expiration() {
        let mut config = Config::default();
        config.checkin.qr_expiration_hours = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("qr_expiration_hours"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("records.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_export_dir_default() {
        let config = Config::default();
        assert_eq!(config.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("churchdesk"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[church]\nname = \"St. Mark\"\ncurrency = \"USD\"\n\n[checkin]\nqr_expiration_hours = 6\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.church.name, "St. Mark");
        assert_eq!(config.church.currency, "USD");
        assert_eq!(config.checkin.qr_expiration_hours, 6);
        assert!(config.checkin.auto_refresh);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[church]\ncurrency = \"naira\"\n").unwrap();

        let result = Config::load_from(Some(path));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_church_config_deserialize_partial() {
        let json = r#"{"name": "Hope Chapel"}"#;
        let church: ChurchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(church.name, "Hope Chapel");
        assert_eq!(church.currency, "NGN");
    }
}
