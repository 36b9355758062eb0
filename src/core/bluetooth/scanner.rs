//! Device discovery
//! Resolves a configured hardware address to a bluest device handle, and
//! lists nearby devices for the `scan` command.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bluest::{Adapter, AdvertisingDevice, Device};
use futures_util::StreamExt;
use log::{debug, info};

use crate::core::bluetooth::device::{LiftDevice, extract_mac_address};
use crate::error::TransportError;

pub struct BluetoothScanner {
    adapter: Adapter,
    devices: Arc<Mutex<HashMap<String, Device>>>,
}

impl BluetoothScanner {
    pub fn new(adapter: Adapter, devices: Arc<Mutex<HashMap<String, Device>>>) -> Self {
        Self { adapter, devices }
    }

    /// Finds the device with `address`, looking at already connected devices
    /// first and then scanning for at most `timeout`.
    pub async fn find_device(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<LiftDevice, TransportError> {
        info!("Checking for connected devices");
        for device in self.adapter.connected_devices().await? {
            if Self::address_matches(&device, address) {
                let name = device.name().unwrap_or_default();
                return Ok(self.remember(device, name));
            }
        }

        info!("Scanning up to {:?} for {}", timeout, address);
        let mut found = None;
        self.scan_for(timeout, |discovered| {
            if Self::address_matches(&discovered.device, address) {
                found = Some(discovered);
                true
            } else {
                false
            }
        })
        .await?;

        match found {
            Some(discovered) => {
                let name = Self::advertised_name(&discovered);
                Ok(self.remember(discovered.device, name))
            }
            None => Err(TransportError::DeviceNotFound(address.to_string())),
        }
    }

    /// Lists every device seen during `duration`, lifts first.
    pub async fn discover(&self, duration: Duration) -> Result<Vec<LiftDevice>, TransportError> {
        let mut seen: HashMap<String, LiftDevice> = HashMap::new();
        self.scan_for(duration, |discovered| {
            let id = discovered.device.id().to_string();
            let name = Self::advertised_name(&discovered);
            let lift = LiftDevice::new(&id, name);
            debug!("Found device - {:?}, RSSI: {:?}", lift, discovered.rssi);
            seen.insert(lift.address.clone(), lift);
            false
        })
        .await?;

        let mut devices: Vec<LiftDevice> = seen.into_values().collect();
        devices.sort_by(|a, b| {
            b.is_lift()
                .cmp(&a.is_lift())
                .then_with(|| a.address.cmp(&b.address))
        });
        Ok(devices)
    }

    /// Feeds advertisements to `on_device` until it returns true, the stream
    /// ends, or `duration` elapses.
    async fn scan_for(
        &self,
        duration: Duration,
        mut on_device: impl FnMut(AdvertisingDevice) -> bool,
    ) -> Result<(), TransportError> {
        let mut scan_stream = self.adapter.scan(&[]).await?;
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    debug!("Scan window elapsed");
                    break;
                }
                result = scan_stream.next() => match result {
                    Some(discovered) => {
                        if on_device(discovered) {
                            break;
                        }
                    }
                    None => {
                        info!("Bluetooth scan stream has ended.");
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn remember(&self, device: Device, name: String) -> LiftDevice {
        let lift = LiftDevice::new(&device.id().to_string(), name);
        info!(
            "Found device: Address: {}, Name: {:?}, Model: {}",
            lift.address, lift.name, lift.model
        );
        if let Ok(mut devices) = self.devices.lock() {
            devices.insert(lift.address.clone(), device);
        }
        lift
    }

    fn advertised_name(discovered: &AdvertisingDevice) -> String {
        discovered
            .device
            .name()
            .ok()
            .or_else(|| discovered.adv_data.local_name.clone())
            .unwrap_or_default()
    }

    fn address_matches(device: &Device, address: &str) -> bool {
        let id = device.id().to_string();
        match extract_mac_address(&id) {
            Some(mac) => mac.eq_ignore_ascii_case(address),
            None => id.eq_ignore_ascii_case(address),
        }
    }
}
