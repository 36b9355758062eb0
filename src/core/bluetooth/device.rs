//! Lift device representation and related functionality

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::bluetooth::constants::{
    LIFT_NAME_PREFIX, MANUFACTURER, MODEL_TVLIFT, MODEL_UNKNOWN,
};

static MAC_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9A-Fa-f]{2}[:_-]){5}([0-9A-Fa-f]{2})").expect("MAC address pattern is valid")
});

/// Known lift models, classified from the advertised name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LiftModel {
    Breagle,
    Unknown,
}

impl LiftModel {
    pub fn from_name(ble_name: &str) -> Self {
        if ble_name.starts_with(LIFT_NAME_PREFIX) {
            Self::Breagle
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breagle => MODEL_TVLIFT,
            Self::Unknown => MODEL_UNKNOWN,
        }
    }
}

impl fmt::Display for LiftModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered lift. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiftDevice {
    /// Hardware address, upper-case and colon separated
    pub address: String,
    /// Advertised name
    pub name: String,
    pub model: LiftModel,
}

impl LiftDevice {
    /// Creates a new LiftDevice, normalising the address when it looks like a MAC
    pub fn new(address: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        let address = extract_mac_address(address).unwrap_or_else(|| address.to_string());
        Self {
            model: LiftModel::from_name(&name),
            address,
            name,
        }
    }

    /// Returns true if this device is a known lift
    pub fn is_lift(&self) -> bool {
        self.model == LiftModel::Breagle
    }
}

/// Host-facing description of a lift entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
}

impl DeviceInfo {
    pub fn new(device: &LiftDevice, display_name: &str) -> Self {
        Self {
            identifier: device.address.clone(),
            name: display_name.to_string(),
            manufacturer: MANUFACTURER,
            model: device.model.as_str(),
        }
    }
}

/// Pulls the last MAC-looking token out of a platform device id and
/// normalises it to `AA:BB:CC:DD:EE:FF`.
pub fn extract_mac_address(device_id_str: &str) -> Option<String> {
    MAC_ADDRESS
        .find_iter(device_id_str)
        .last()
        .map(|m| m.as_str().replace(['-', '_'], ":").to_uppercase())
}
