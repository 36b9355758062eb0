//! Error types shared across the crate.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Every failure the BLE transport can produce.
///
/// Callers of the lift controller never branch on the variant: a lift that
/// cannot be reached simply stays unavailable. The variants only exist to
/// make the log lines useful.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no Bluetooth adapter found")]
    NoAdapter,

    #[error("device {0} has not been discovered")]
    DeviceNotFound(String),

    #[error("characteristic {0} not found on device")]
    CharacteristicNotFound(Uuid),

    #[error("failed to connect after {attempts} attempts: {last_error}")]
    ConnectFailed { attempts: u32, last_error: String },

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("not connected")]
    NotConnected,

    #[error("write failed: {0}")]
    Write(String),

    #[error("disconnect failed: {0}")]
    Disconnect(String),

    #[error(transparent)]
    Bluetooth(#[from] bluest::Error),
}

/// Problems found while validating a [`crate::config::LiftConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a lift hardware address is required")]
    MissingAddress,

    #[error("invalid hardware address {0:?}, expected XX:XX:XX:XX:XX:XX")]
    InvalidAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}
