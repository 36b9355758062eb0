//! Application state management
//! This module wires the Bluetooth manager, the lift controller and the
//! shutdown event together for the host binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::LiftConfig;
use crate::core::{BluetoothManager, LiftController, LiftSnapshot};

/// Global application state
pub struct AppState {
    /// The controller of the configured lift
    pub controller: Arc<LiftController>,
    /// Fired once when the host shuts down
    pub shutdown: CancellationToken,
    /// Every snapshot the controller publishes
    pub snapshots: watch::Receiver<LiftSnapshot>,
    pub config: LiftConfig,
}

impl AppState {
    /// Opens the adapter, finds the configured lift and builds its controller
    pub async fn new(config: LiftConfig) -> Result<Self> {
        info!("Initializing BluetoothManager...");
        let manager = BluetoothManager::new(&config)
            .await
            .context("failed to open the Bluetooth adapter")?;

        let device = manager
            .find_lift(config.address(), config.scan_timeout())
            .await
            .with_context(|| format!("failed to find lift {}", config.address()))?;

        let (sink, snapshots) = watch::channel(LiftSnapshot::default());
        let shutdown = CancellationToken::new();
        let controller = LiftController::new(
            device,
            config.name.clone(),
            Arc::new(manager),
            Arc::new(sink),
            shutdown.clone(),
        )
        .with_connect_attempts(config.connect_attempts);

        Ok(Self {
            controller: Arc::new(controller),
            shutdown,
            snapshots,
            config,
        })
    }

    /// Gets a reference to the lift controller
    pub fn get_controller_arc(&self) -> Arc<LiftController> {
        self.controller.clone()
    }
}
