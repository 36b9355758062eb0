//! Constants used throughout the application
//! This module contains all the constant values used in the application,
//! such as UUIDs, timeouts, command payloads and other configuration values.

use uuid::Uuid;

/// Integration domain, also the default display name of a lift
pub const DOMAIN: &str = "breagle";

/// Advertised-name prefix of the supported lift model
pub const LIFT_NAME_PREFIX: &str = "limoss";

/// Manufacturer reported in the device info
pub const MANUFACTURER: &str = "Limoss";

/// Model names
pub const MODEL_TVLIFT: &str = "Breagle";
pub const MODEL_UNKNOWN: &str = "Unknown";

/// The UUID of the lift control characteristic
pub const UUID_CONTROL_CHAR: Uuid = Uuid::from_u128(0x0000ffe1_0000_1000_8000_00805f9b34fb);

/// Lift command packet size in bytes
pub const LIFT_COMMAND_PACKET_SIZE: usize = 10;

/// Payload that lowers (closes) the lift
pub const CLOSE_PAYLOAD: [u8; LIFT_COMMAND_PACKET_SIZE] =
    [0xDD, 0xA2, 0x12, 0xA0, 0x44, 0x6A, 0x3D, 0xBF, 0xC7, 0xA2];

/// Payload that raises (opens) the lift
pub const OPEN_PAYLOAD: [u8; LIFT_COMMAND_PACKET_SIZE] =
    [0xDD, 0x29, 0xCC, 0xEA, 0x3F, 0xEE, 0x31, 0x9C, 0x54, 0x0A];

/// Maximum number of connection attempts
pub const MAX_CONNECT_ATTEMPTS: u32 = 4;

/// Delay between connection attempts in milliseconds
pub const CONNECT_RETRY_DELAY_MS: u64 = 1000;

/// Timeout for Bluetooth operations in seconds
pub const BLUETOOTH_OPERATION_TIMEOUT_SECS: u64 = 10;

/// Scan duration in seconds
pub const DEFAULT_SCAN_DURATION_SECS: u64 = 10;

/// Refresh interval in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
