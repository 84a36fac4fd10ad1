//! Configuration management (config.toml)
//!
//! Settings live in TOML in the platform-specific config directory. Every
//! field has a default, so partial or missing files are fine.

use crate::format::MacroFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Conversion defaults
    #[serde(default)]
    pub convert: ConvertConfig,
}

/// Defaults applied to every conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Target format when none is given (default: replaybot)
    #[serde(default = "default_target")]
    pub default_target: MacroFormat,
    /// Extension for formats without a canonical one (default: bin)
    #[serde(default = "default_fallback_extension")]
    pub fallback_extension: String,
    /// Always drop redundant actions (default: false)
    #[serde(default)]
    pub remove_redundant: bool,
    /// Always sort by position before encoding (default: false)
    #[serde(default)]
    pub sort_output: bool,
}

fn default_target() -> MacroFormat {
    MacroFormat::ReplayBot
}
fn default_fallback_extension() -> String {
    "bin".to_string()
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            default_target: default_target(),
            fallback_extension: default_fallback_extension(),
            remove_redundant: false,
            sort_output: false,
        }
    }
}

/// Failure reading or writing an explicit config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no config directory available on this platform")]
    NoConfigDir,
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Macroconv\config`
/// On macOS: `~/Library/Application Support/io.macroconv.Macroconv`
/// On Linux: `~/.config/macroconv`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.macroconv", "", "Macroconv")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Full path of the default config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Loads the configuration from the default location.
///
/// Returns defaults if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    match load_from(&path) {
        Ok(config) => config,
        Err(err) => {
            if path.exists() {
                tracing::warn!(%err, "ignoring unreadable config, using defaults");
            }
            Config::default()
        }
    }
}

/// Loads the configuration from `path`, reporting any failure
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves the configuration to the default location.
///
/// Creates the directory if it doesn't exist and returns the written path.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(&path, config)?;
    Ok(path)
}

/// Writes `config` to `path`, creating parent directories
pub fn save_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(io_err)?;
    tracing::debug!(path = %path.display(), "saved config");
    Ok(())
}
