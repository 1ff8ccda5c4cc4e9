//! Bridge configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Jira connection settings read from the plug's JSON config file.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the Jira install, possibly below a sub-path
    /// (e.g. `https://intranet.example.com/jira`).
    #[serde(rename = "serverUrl", default)]
    pub server_url: String,
    #[serde(default)]
    pub user: String,
    /// Password or API token.
    #[serde(default)]
    pub password: String,
}

impl Config {
    pub fn new(
        server_url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        check_field_is_not_empty("serverUrl", &self.server_url)?;
        check_field_is_not_empty("user", &self.user)?;
        check_field_is_not_empty("password", &self.password)?;
        Ok(())
    }
}

fn check_field_is_not_empty(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!(
            "The field '{}' must be defined in the config",
            field_name
        )));
    }
    Ok(())
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}
