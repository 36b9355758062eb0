//! Command line commands
//! This module defines all the commands that can be invoked from the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{LevelFilter, error, info};
use serde_json::json;

use crate::config::LiftConfig;
use crate::core::BluetoothManager;
use crate::core::bluetooth::{DEFAULT_SCAN_DURATION_SECS, LiftCommand};
use crate::state::AppState;

/// Control a Breagle / Limoss TV lift over Bluetooth LE
#[derive(Debug, Parser)]
#[command(name = "breagle-lift", version, about)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Hardware address of the lift, overrides the config file
    #[arg(long, global = true)]
    pub address: Option<String>,

    /// Display name of the lift, overrides the config file
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Log level, `RUST_LOG` takes precedence
    #[arg(long, global = true, default_value = "info", value_parser = parse_level)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Keep the lift connected until Ctrl-C, reconnecting on schedule
    Run,
    /// Raise the lift
    Open,
    /// Lower the lift
    Close,
    /// List nearby Bluetooth LE devices
    Scan {
        /// Seconds to listen for advertisements
        #[arg(long, default_value_t = DEFAULT_SCAN_DURATION_SECS)]
        duration: u64,
    },
    /// Write a configuration file from the defaults and the given flags
    InitConfig {
        path: PathBuf,
    },
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value.parse().map_err(|_| {
        format!("unknown log level {value:?}, expected off, error, warn, info, debug or trace")
    })
}

/// Dispatches a parsed command line
pub async fn execute(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => LiftConfig::load_config(path).await?,
        None => LiftConfig::default(),
    }
    .with_overrides(cli.address, cli.name);

    match cli.command {
        Command::Run => run(AppState::new(config.validate()?).await?).await,
        Command::Open => {
            one_shot(AppState::new(config.validate()?).await?, LiftCommand::Open).await
        }
        Command::Close => {
            one_shot(AppState::new(config.validate()?).await?, LiftCommand::Close).await
        }
        Command::Scan { duration } => scan(&config, Duration::from_secs(duration)).await,
        Command::InitConfig { path } => init_config(config, &path).await,
    }
}

/// Starts the controller and keeps it alive until Ctrl-C
async fn run(app_state: AppState) -> Result<()> {
    let controller = app_state.get_controller_arc();
    let shutdown = app_state.shutdown.clone();

    let mut snapshots = app_state.snapshots.clone();
    let reporter_shutdown = shutdown.clone();
    let unique_id = controller.unique_id().to_string();
    let reporter = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = reporter_shutdown.cancelled() => break,
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = *snapshots.borrow_and_update();
                    info!("{} state: {}", unique_id, json!(snapshot));
                }
            }
        }
    });

    let listener = controller.start().await;
    let poller = controller.spawn_polling(app_state.config.poll_interval());
    info!("Controlling {} ({}), press Ctrl-C to stop", controller.name(), controller.unique_id());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
    }
    info!("Shutting down");
    shutdown.cancel();

    for task in [listener, poller, reporter] {
        if let Err(e) = task.await {
            error!("Task ended abnormally: {}", e);
        }
    }
    Ok(())
}

/// Connects, sends one command and disconnects
async fn one_shot(app_state: AppState, command: LiftCommand) -> Result<()> {
    let controller = app_state.get_controller_arc();

    let sent = match command {
        LiftCommand::Open => controller.open().await,
        LiftCommand::Close => controller.close().await,
    };
    let snapshot = controller.snapshot();
    controller.remove().await;

    let report = json!({
        "device": controller.device_info(),
        "state": snapshot,
        "sent": sent,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !sent {
        bail!("{:?} command was not delivered to {}", command, controller.unique_id());
    }
    Ok(())
}

/// Prints nearby devices, lifts first
async fn scan(config: &LiftConfig, duration: Duration) -> Result<()> {
    let manager = BluetoothManager::new(config)
        .await
        .context("failed to open the Bluetooth adapter")?;

    let devices = manager.scan(duration).await?;
    if devices.is_empty() {
        println!("No devices found");
    }
    for device in devices {
        println!("{}  {:<8}  {}", device.address, device.model, device.name);
    }
    Ok(())
}

async fn init_config(config: LiftConfig, path: &Path) -> Result<()> {
    let config = config.validate()?;
    config.save_config(path).await?;
    println!("Wrote {}", path.display());
    Ok(())
}
