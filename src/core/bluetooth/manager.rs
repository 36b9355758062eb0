//! Bluetooth manager for the lift controller
//! This module provides the bluest-backed transport used by the lift controller

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bluest::{Adapter, Device};
use log::info;

use crate::config::LiftConfig;
use crate::core::bluetooth::connection::ConnectionManager;
use crate::core::bluetooth::device::LiftDevice;
use crate::core::bluetooth::scanner::BluetoothScanner;
use crate::core::bluetooth::types::{DisconnectCallback, LiftConnection, Transport};
use crate::error::TransportError;

/// Manages Bluetooth operations
pub struct BluetoothManager {
    /// Map of device addresses to devices
    devices: Arc<Mutex<HashMap<String, Device>>>,
    /// Connection manager
    connection_manager: ConnectionManager,
    /// Bluetooth scanner
    scanner: BluetoothScanner,
}

impl BluetoothManager {
    /// Creates a new BluetoothManager on the default adapter
    pub async fn new(config: &LiftConfig) -> Result<Self, TransportError> {
        let adapter = Adapter::default().await.ok_or(TransportError::NoAdapter)?;
        adapter.wait_available().await?;
        info!("Bluetooth adapter is available.");

        let devices = Arc::new(Mutex::new(HashMap::new()));
        let connection_manager = ConnectionManager::new(
            adapter.clone(),
            config.retry_delay(),
            config.connect_timeout(),
        );
        let scanner = BluetoothScanner::new(adapter, devices.clone());

        Ok(Self {
            devices,
            connection_manager,
            scanner,
        })
    }

    /// Resolves a hardware address to a lift, scanning if needed
    pub async fn find_lift(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<LiftDevice, TransportError> {
        self.scanner.find_device(address, timeout).await
    }

    /// Lists nearby devices
    pub async fn scan(&self, duration: Duration) -> Result<Vec<LiftDevice>, TransportError> {
        self.scanner.discover(duration).await
    }

    fn device_handle(&self, address: &str) -> Option<Device> {
        self.devices
            .lock()
            .ok()
            .and_then(|devices| devices.get(address).cloned())
    }
}

#[async_trait]
impl Transport for BluetoothManager {
    async fn connect(
        &self,
        device: &LiftDevice,
        max_attempts: u32,
        on_disconnect: DisconnectCallback,
    ) -> Result<Box<dyn LiftConnection>, TransportError> {
        let handle = self
            .device_handle(&device.address)
            .ok_or_else(|| TransportError::DeviceNotFound(device.address.clone()))?;

        let connection = self
            .connection_manager
            .connect_with_retry(&handle, &device.address, max_attempts, on_disconnect)
            .await?;
        Ok(Box::new(connection))
    }
}
