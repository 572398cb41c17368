//! Client configuration management.
//!
//! This module handles selecting the Daemo environment (production, sandbox
//! or a custom deployment) and where credentials are read from, plus loading
//! and saving that configuration.
//!
//! Configuration is stored at `~/.config/daemo/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "daemo";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Credential file used when none is configured
const DEFAULT_CREDENTIAL_FILE: &str = "credentials.json";

/// HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const PRODUCTION_URL: &str = "https://daemo.org";
pub const SANDBOX_URL: &str = "https://sandbox.daemo.org";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Sandbox,
    /// Self-hosted or test deployment at the given base URL.
    Custom(String),
}

impl Environment {
    pub fn base_url(&self) -> &str {
        match self {
            Environment::Production => PRODUCTION_URL,
            Environment::Sandbox => SANDBOX_URL,
            Environment::Custom(url) => url.trim_end_matches('/'),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub credential_file: Option<PathBuf>,
    pub environment: Environment,
    /// Refresh the access token at construction and save it back.
    pub refresh_credentials: bool,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credential_file: Some(PathBuf::from(DEFAULT_CREDENTIAL_FILE)),
            environment: Environment::default(),
            refresh_credentials: false,
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(credential_file: impl Into<PathBuf>, environment: Environment) -> Self {
        Self {
            credential_file: Some(credential_file.into()),
            environment,
            ..Default::default()
        }
    }

    pub fn refresh_credentials(mut self, refresh: bool) -> Self {
        self.refresh_credentials = refresh;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
