//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a JSON document on the SD card.  A
//! missing file means factory defaults; anything present must parse and
//! pass [`SystemConfig::validate`], values are never clamped.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

pub const CONFIG_FILE: &str = "vapor.json";

pub struct ConfigFileAdapter {
    path: PathBuf,
}

impl ConfigFileAdapter {
    /// Config at `<mount_point>/vapor.json`.
    pub fn new(mount_point: impl AsRef<Path>) -> Self {
        Self {
            path: mount_point.as_ref().join(CONFIG_FILE),
        }
    }
}

impl ConfigPort for ConfigFileAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No {} found, using defaults", self.path.display());
                return Ok(SystemConfig::default());
            }
            Err(e) => {
                warn!("Config read failed: {}", e);
                return Err(ConfigError::IoError);
            }
        };
        let config: SystemConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Config parse failed: {}", e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("Config loaded from {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string(config).map_err(|_| ConfigError::Corrupted)?;
        std::fs::write(&self.path, text).map_err(|e| {
            warn!("Config write failed: {}", e);
            ConfigError::IoError
        })
    }
}
