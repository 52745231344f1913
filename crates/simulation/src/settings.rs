//! Mock Mode Settings
//!
//! Simulations only run in builds with mock mode enabled. The flag is read
//! from an optional settings file and `MOCK_DRIVE_*` environment variables,
//! environment taking precedence.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Prefix of environment variables overriding settings
pub const ENV_PREFIX: &str = "MOCK_DRIVE";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// Build-level switches of the mock drive framework
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockSettings {
    /// Whether drives may be simulated. Absent means off.
    #[serde(default)]
    pub mock_mode_enabled: bool,
}

impl MockSettings {
    /// Settings with mock mode on
    pub fn mock_enabled() -> Self {
        Self {
            mock_mode_enabled: true,
        }
    }

    /// Load settings from an optional file plus `MOCK_DRIVE_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder().set_default("mock_mode_enabled", false)?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        debug!("Loaded mock settings: {:?}", settings);
        Ok(settings)
    }

    /// Parse settings from TOML text, ignoring the environment
    pub fn from_toml(contents: &str) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .set_default("mock_mode_enabled", false)?
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_off() {
        assert!(!MockSettings::default().mock_mode_enabled);
        assert!(!MockSettings::from_toml("").unwrap().mock_mode_enabled);
    }

    #[test]
    fn test_from_toml() {
        let settings = MockSettings::from_toml("mock_mode_enabled = true").unwrap();
        assert_eq!(settings, MockSettings::mock_enabled());
    }

    #[test]
    fn test_missing_file_is_optional() {
        let settings = MockSettings::load(Some(Path::new("/nonexistent/mock-drive.toml")));
        assert!(settings.is_ok());
    }

    #[test]
    fn test_malformed_value_rejected() {
        assert!(MockSettings::from_toml("mock_mode_enabled = \"maybe\"").is_err());
    }
}
