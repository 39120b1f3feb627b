//! Reading `config.toml`, and seeding it from the template on first run.

mod template;

#[cfg(test)]
mod tests;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;
use wcbridge_common::ConfigError;

use crate::schema::BridgeConfig;

use template::default_config_toml;

/// `<config_dir>/wcbridge/config.toml`, e.g. `~/.config/wcbridge/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("wcbridge").join("config.toml"))
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))
}

/// Parse the file at `path`. Missing keys take their defaults; values are
/// not validated here.
pub fn read_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        }
    };
    let config = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Like [`read_config`], but a missing file is created from the template
/// and yields the defaults.
pub fn read_or_seed(path: &Path) -> Result<BridgeConfig, ConfigError> {
    match read_config(path) {
        Err(ConfigError::FileNotFound(_)) => {
            seed_config(path)?;
            Ok(BridgeConfig::default())
        }
        other => other,
    }
}

/// Write the commented template to `path`, creating parent directories.
pub fn seed_config(path: &Path) -> Result<(), ConfigError> {
    let write_err = |what: &str, at: &Path, e: std::io::Error| {
        ConfigError::ParseError(format!("failed to {what} {}: {e}", at.display()))
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| write_err("create config directory", parent, e))?;
    }
    std::fs::write(path, default_config_toml())
        .map_err(|e| write_err("write default config to", path, e))?;
    info!("created default config at {}", path.display());
    Ok(())
}
