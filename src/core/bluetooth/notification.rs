//! Link-loss notifications for the lift
//! This module watches the adapter's connection events for one device and
//! reports unexpected disconnects through the registered callback.
//!
//! The lift's notify characteristic shares its UUID with the control
//! characteristic but never carries a payload we know how to decode, so no
//! characteristic subscription is made here.

use bluest::{Adapter, ConnectionEvent, Device};
use futures_util::{Stream, StreamExt};
use log::{debug, error, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::bluetooth::types::DisconnectCallback;

/// Watches one device session for link drops
pub struct DisconnectWatcher;

impl DisconnectWatcher {
    /// Spawns the watcher task. Cancel `token` to stop it without firing the callback.
    pub fn spawn(
        adapter: Adapter,
        device: Device,
        address: String,
        on_disconnect: DisconnectCallback,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            Self::watch(&adapter, &device, &address, &on_disconnect, &token).await;
        })
    }

    async fn watch(
        adapter: &Adapter,
        device: &Device,
        address: &str,
        on_disconnect: &DisconnectCallback,
        token: &CancellationToken,
    ) {
        let events = match adapter.device_connection_events(device).await {
            Ok(events) => events,
            Err(e) => {
                error!("Failed to watch connection events for {}: {}", address, e);
                return;
            }
        };

        debug!("Watching connection events for {}", address);
        forward_events(events, address, on_disconnect, token).await;
    }
}

/// Fires `on_disconnect` on the first `Disconnected` event. Cancellation wins
/// over an event that is ready at the same time.
async fn forward_events<S>(
    mut events: S,
    address: &str,
    on_disconnect: &DisconnectCallback,
    token: &CancellationToken,
) where
    S: Stream<Item = ConnectionEvent> + Unpin,
{
    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => {
                debug!("Stopped watching {}", address);
                break;
            }
            event = events.next() => match event {
                Some(ConnectionEvent::Disconnected) => {
                    info!("Link to {} dropped", address);
                    on_disconnect(address);
                    break;
                }
                Some(ConnectionEvent::Connected) => {
                    debug!("Connected event for {}", address);
                }
                None => {
                    info!("Connection event stream for {} has ended.", address);
                    break;
                }
            }
        }
    }
}
