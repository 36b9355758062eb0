//! Bluetooth connection handling for the lift
//! This module handles connecting to and disconnecting from the lift

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bluest::{Adapter, Characteristic, Device};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::bluetooth::constants::UUID_CONTROL_CHAR;
use crate::core::bluetooth::notification::DisconnectWatcher;
use crate::core::bluetooth::types::{ConnectedDeviceState, DisconnectCallback, LiftConnection};
use crate::error::TransportError;

/// Runs `attempt` up to `max_attempts` times, bounding each try by
/// `attempt_timeout` and sleeping `retry_delay` between failures.
pub async fn retry_with_timeout<T, F, Fut>(
    max_attempts: u32,
    retry_delay: Duration,
    attempt_timeout: Duration,
    mut attempt: F,
) -> Result<T, TransportError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut last_error = None;

    for attempt_no in 1..=max_attempts {
        let result = match tokio::time::timeout(attempt_timeout, attempt(attempt_no)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(attempt_timeout)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("Connection attempt {} failed: {}", attempt_no, e);
                last_error = Some(e.to_string());

                if attempt_no < max_attempts {
                    info!("Retrying connection in {} ms...", retry_delay.as_millis());
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }

    Err(TransportError::ConnectFailed {
        attempts: max_attempts,
        last_error: last_error.unwrap_or_else(|| "no attempt was made".to_string()),
    })
}

/// Bounds a single bluest operation by `limit`.
async fn timed<T>(
    limit: Duration,
    operation: impl Future<Output = Result<T, bluest::Error>>,
) -> Result<T, TransportError> {
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result.map_err(TransportError::from),
        Err(_) => Err(TransportError::Timeout(limit)),
    }
}

/// Connection manager for the lift
#[derive(Clone)]
pub struct ConnectionManager {
    adapter: Adapter,
    retry_delay: Duration,
    operation_timeout: Duration,
}

impl ConnectionManager {
    pub fn new(adapter: Adapter, retry_delay: Duration, operation_timeout: Duration) -> Self {
        Self { adapter, retry_delay, operation_timeout }
    }

    /// Connect to the lift with retry mechanism (bluest version)
    pub async fn connect_with_retry(
        &self,
        device: &Device,
        address: &str,
        max_attempts: u32,
        on_disconnect: DisconnectCallback,
    ) -> Result<BluestConnection, TransportError> {
        let control_characteristic = retry_with_timeout(
            max_attempts,
            self.retry_delay,
            self.operation_timeout,
            move |attempt| {
                debug!("Connecting to {} (attempt {}/{})", address, attempt, max_attempts);
                self.try_connect(device)
            },
        )
        .await?;

        info!("Successfully connected to {}", address);

        let watcher_token = CancellationToken::new();
        DisconnectWatcher::spawn(
            self.adapter.clone(),
            device.clone(),
            address.to_string(),
            on_disconnect,
            watcher_token.clone(),
        );

        Ok(BluestConnection {
            adapter: self.adapter.clone(),
            address: address.to_string(),
            operation_timeout: self.operation_timeout,
            state: ConnectedDeviceState {
                device: device.clone(),
                control_characteristic,
                watcher_token,
            },
        })
    }

    /// Try to connect to the lift and locate its control characteristic
    async fn try_connect(&self, device: &Device) -> Result<Characteristic, TransportError> {
        let id = device.id().to_string();

        if !device.is_connected().await {
            info!("Initiating connection to {}...", id);
            self.adapter.connect_device(device).await?;
        }

        debug!("Connection successful, discovering services...");
        for service in device.services().await? {
            for characteristic in service.characteristics().await? {
                if characteristic.uuid() == UUID_CONTROL_CHAR {
                    debug!("Found control characteristic in service {}", service.uuid());
                    return Ok(characteristic);
                }
            }
        }

        // leave the link down so the next attempt starts clean
        if let Err(e) = self.adapter.disconnect_device(device).await {
            debug!("Cleanup after failed discovery on {} failed: {}", id, e);
        }
        Err(TransportError::CharacteristicNotFound(UUID_CONTROL_CHAR))
    }
}

/// A live bluest session with one lift
pub struct BluestConnection {
    adapter: Adapter,
    address: String,
    operation_timeout: Duration,
    state: ConnectedDeviceState,
}

#[async_trait]
impl LiftConnection for BluestConnection {
    async fn is_connected(&self) -> bool {
        self.state.device.is_connected().await
    }

    async fn write(&self, uuid: Uuid, payload: &[u8]) -> Result<(), TransportError> {
        let characteristic = &self.state.control_characteristic;
        if characteristic.uuid() != uuid {
            return Err(TransportError::CharacteristicNotFound(uuid));
        }

        debug!("Writing {:02X?} to {} on {}", payload, uuid, self.address);
        timed(self.operation_timeout, characteristic.write(payload))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        // local teardown must not look like a link drop
        self.state.watcher_token.cancel();

        if self.state.device.is_connected().await {
            info!("Disconnecting from device {}", self.address);
            timed(self.operation_timeout, self.adapter.disconnect_device(&self.state.device))
                .await
                .map_err(|e| TransportError::Disconnect(e.to_string()))?;
            info!("Successfully disconnected");
        } else {
            debug!("Device {} not connected", self.address);
        }
        Ok(())
    }
}
