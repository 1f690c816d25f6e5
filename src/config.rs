//! Configuration file support
//!
//! A TOML file can provide the transport string, driver options and the
//! status fields applied by `configure`. Command line flags take precedence.
//!
//! ```toml
//! transport = "linux_spi:dev=/dev/spidev0.0,spispeed=20000"
//! capacity = 524288
//! check-bounds = true
//!
//! [settings]
//! mode = "sequential"
//! page-size = "256"
//! slew-rate = "4.33"
//! drive-strength = "50"
//! ```

use serde::Deserialize;
use sram23_core::device::SramConfig;
use sram23_core::status::Settings;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or has unknown keys
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Capacity is zero or not a power of two
    #[error("Invalid capacity: {0} (must be a power of two)")]
    InvalidCapacity(u32),
}

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Transport string, e.g. `linux_spi:dev=/dev/spidev0.0`
    pub transport: Option<String>,
    /// Array size in bytes
    pub capacity: Option<u32>,
    /// Reject accesses past the end of the array
    pub check_bounds: Option<bool>,
    /// Status fields written by `configure`
    pub settings: Settings,
}

impl Config {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        if let Some(capacity) = config.capacity {
            if capacity == 0 || !capacity.is_power_of_two() {
                return Err(ConfigError::InvalidCapacity(capacity));
            }
        }
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Driver configuration with this file's overrides applied
    pub fn sram_config(&self) -> SramConfig {
        let mut config = SramConfig::default();
        if let Some(capacity) = self.capacity {
            config = config.capacity(capacity);
        }
        if let Some(check) = self.check_bounds {
            config = config.check_bounds(check);
        }
        config
    }
}

/// Load the configuration from `path`, or from the default locations
///
/// A missing file in a default location is not an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        let config = Config::from_toml_file(path)?;
        log::info!("Loaded configuration from {}", path.display());
        return Ok(config);
    }

    let default_paths = [
        PathBuf::from("sram23.toml"),
        PathBuf::from("/etc/sram23.toml"),
    ];
    for path in &default_paths {
        if path.is_file() {
            let config = Config::from_toml_file(path)?;
            log::debug!("Loaded configuration from {}", path.display());
            return Ok(config);
        }
    }

    Ok(Config::default())
}
