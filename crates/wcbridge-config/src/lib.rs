//! Wallet bridge configuration.
//!
//! TOML-based configuration for the iframe relay and the tab controller.
//! All config sections use defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wcbridge_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config.relay.tab_url);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    BridgeConfig, ChannelConfig, LogLevel, LoggingConfig, RelayConfig, TabConfig,
};

use std::path::Path;

use wcbridge_common::ConfigError;

/// Load config from the platform default path and validate it.
///
/// Creates a default `config.toml` if none exists.
pub fn load_config() -> Result<BridgeConfig, ConfigError> {
    let path = toml_loader::default_config_path()?;
    let config = toml_loader::read_or_seed(&path)?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path and validate it.
pub fn load_config_from(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let config = toml_loader::read_config(path)?;
    validation::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validation::validate(&BridgeConfig::default()).is_ok());
    }

    #[test]
    fn load_config_from_missing_file_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
        assert!(!path.exists());
    }

    #[test]
    fn load_config_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[channel]\ncapacity = 0\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
