//! Configuration file loading

use crate::{models::Config, Error, Result};
use std::path::PathBuf;

pub struct ConfigStorage {
    config_path: PathBuf,
}

impl ConfigStorage {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Read and validate the config file. Every failure is reported as
    /// [`Error::Config`] carrying the underlying reason.
    pub fn load(&self) -> Result<Config> {
        self.read().map_err(|e| match e {
            Error::Config(_) => e,
            other => Error::Config(other.to_string()),
        })
    }

    fn read(&self) -> Result<Config> {
        let content = std::fs::read_to_string(&self.config_path)?;

        if content.trim().is_empty() || content.trim() == "null" {
            return Err(Error::Validation(format!(
                "Config file {} is not valid",
                self.config_path.display()
            )));
        }

        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}
