//! Core functionality for the lift controller
//! This module contains the core functionality for interfacing with the lift

pub mod bluetooth;
pub mod lift;

// Re-export commonly used types
pub use bluetooth::BluetoothManager;
pub use lift::{LiftController, LiftSnapshot, StateSink};
