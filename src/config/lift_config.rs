use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::core::bluetooth::{
    BLUETOOTH_OPERATION_TIMEOUT_SECS, CONNECT_RETRY_DELAY_MS, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_SCAN_DURATION_SECS, DOMAIN, MAX_CONNECT_ATTEMPTS, extract_mac_address,
};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftConfig {
    /// Hardware address of the lift. Required.
    pub address: Option<String>,

    /// Display name of the lift entity.
    pub name: String,

    /// Attempts made by every connect before giving up.
    pub connect_attempts: u32,

    /// Bound on each connect attempt, write and teardown.
    pub connect_timeout_secs: u64,

    /// Pause between two connect attempts.
    pub retry_delay_ms: u64,

    /// How often an unavailable lift is reconnected.
    pub poll_interval_secs: u64,

    /// How long to look for the lift at startup.
    pub scan_timeout_secs: u64,
}

impl Default for LiftConfig {
    fn default() -> Self {
        LiftConfig {
            address: None,
            name: DOMAIN.to_string(),
            connect_attempts: MAX_CONNECT_ATTEMPTS,
            connect_timeout_secs: BLUETOOTH_OPERATION_TIMEOUT_SECS,
            retry_delay_ms: CONNECT_RETRY_DELAY_MS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            scan_timeout_secs: DEFAULT_SCAN_DURATION_SECS,
        }
    }
}

impl LiftConfig {
    /// Loads the config from a configuration file, falling back to defaults
    /// when the file does not exist.
    pub async fn load_config(file_path: &Path) -> Result<Self> {
        if !file_path.exists() {
            warn!("Config file not found at {:?}, using default.", file_path);
            return Ok(Self::default());
        }

        let config_json = fs::read_to_string(file_path)
            .await
            .with_context(|| format!("failed to read {:?}", file_path))?;
        let config: Self = serde_json::from_str(&config_json)
            .with_context(|| format!("failed to parse {:?}", file_path))?;

        info!("Config loaded from {:?}", file_path);
        Ok(config)
    }

    /// Saves the current config to a configuration file, creating its
    /// directory when needed.
    pub async fn save_config(&self, file_path: &Path) -> Result<()> {
        if let Some(config_dir) = file_path.parent() {
            if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
                fs::create_dir_all(config_dir)
                    .await
                    .with_context(|| format!("failed to create {:?}", config_dir))?;
                debug!("Created config directory {:?}", config_dir);
            }
        }

        let config_json = match serde_json::to_string_pretty(&self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize lift config to JSON: {}", e);
                return Err(e.into());
            }
        };

        fs::write(file_path, config_json).await?;

        info!("Lift config saved to {:?}.", file_path);
        Ok(())
    }

    /// Applies command line overrides on top of the file values
    pub fn with_overrides(mut self, address: Option<String>, name: Option<String>) -> Self {
        if address.is_some() {
            self.address = address;
        }
        if let Some(name) = name {
            self.name = name;
        }
        self
    }

    /// Checks the config and normalises the address to `AA:BB:CC:DD:EE:FF`
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let raw = self.address.as_deref().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(ConfigError::MissingAddress);
        }
        match extract_mac_address(raw) {
            Some(mac) if mac.len() == raw.len() => self.address = Some(mac),
            _ => return Err(ConfigError::InvalidAddress(raw.to_string())),
        }

        if self.name.trim().is_empty() {
            self.name = DOMAIN.to_string();
        }
        if self.connect_attempts == 0 {
            return Err(ConfigError::Zero("connect_attempts"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Zero("connect_timeout_secs"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Zero("poll_interval_secs"));
        }
        Ok(self)
    }

    /// The validated address, empty before [`Self::validate`] has run
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or_default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}
