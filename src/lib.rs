//! Breagle lift controller library
//! This is the main library for controlling a Breagle / Limoss TV lift over Bluetooth LE.

// Module declarations
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod state;

pub use crate::core::{LiftController, LiftSnapshot, StateSink};
pub use crate::error::{ConfigError, TransportError};
