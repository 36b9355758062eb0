//! Bluetooth functionality for the lift controller
//! This module handles all bluetooth operations including scanning,
//! connecting, writing commands to and watching the link of a lift.

mod commands;
mod connection;
mod constants;
mod device;
mod manager;
mod notification;
mod scanner;
mod types;

// Re-export types that should be publicly accessible
pub use commands::LiftCommand;
pub use connection::{BluestConnection, ConnectionManager, retry_with_timeout};
pub use constants::*; // Re-export all constants
pub use device::{DeviceInfo, LiftDevice, LiftModel, extract_mac_address};
pub use manager::BluetoothManager;
pub use notification::DisconnectWatcher;
pub use scanner::BluetoothScanner;
pub use types::{ConnectedDeviceState, DisconnectCallback, LiftConnection, Transport};
