//! Defines shared data structures and the transport seams of the Bluetooth module.

use std::sync::Arc;

use async_trait::async_trait;
use bluest::{Characteristic, Device};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::bluetooth::device::LiftDevice;
use crate::error::TransportError;

/// Called by the transport when a link drops outside of any command flow.
/// The argument is the hardware address of the device that went away.
pub type DisconnectCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Establishes sessions with lift devices.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to `device`, trying at most `max_attempts` times.
    ///
    /// `on_disconnect` fires whenever the returned session drops without
    /// being torn down locally.
    async fn connect(
        &self,
        device: &LiftDevice,
        max_attempts: u32,
        on_disconnect: DisconnectCallback,
    ) -> Result<Box<dyn LiftConnection>, TransportError>;
}

/// A live session with one lift.
#[async_trait]
pub trait LiftConnection: Send + Sync {
    /// Liveness check
    async fn is_connected(&self) -> bool;

    /// Write `payload` to the characteristic identified by `uuid`
    async fn write(&self, uuid: Uuid, payload: &[u8]) -> Result<(), TransportError>;

    /// Graceful teardown. Calling it twice must not fail.
    async fn disconnect(&self) -> Result<(), TransportError>;
}

/// Represents the state of a successfully connected device.
/// This struct holds the active handles needed for interaction.
#[derive(Clone)]
pub struct ConnectedDeviceState {
    /// The device handle, used for things like checking connection status or disconnecting.
    pub device: Device,
    /// The characteristic handle for writing commands to the lift.
    pub control_characteristic: Characteristic,
    /// Stops the disconnect watcher when the session is torn down locally.
    pub watcher_token: CancellationToken,
}
