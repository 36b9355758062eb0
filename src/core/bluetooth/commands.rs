//! Lift commands implementation
//! This module contains all the commands that can be sent to the lift

use crate::core::bluetooth::constants::{CLOSE_PAYLOAD, LIFT_COMMAND_PACKET_SIZE, OPEN_PAYLOAD};

/// Lift commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftCommand {
    /// Raise the lift (DD 29 CC EA 3F EE 31 9C 54 0A)
    Open,
    /// Lower the lift (DD A2 12 A0 44 6A 3D BF C7 A2)
    Close,
}

impl LiftCommand {
    /// Convert the command to its byte representation
    pub fn to_bytes(&self) -> [u8; LIFT_COMMAND_PACKET_SIZE] {
        match self {
            Self::Open => OPEN_PAYLOAD,
            Self::Close => CLOSE_PAYLOAD,
        }
    }

    /// The position the lift is believed to be in once the command was sent
    pub fn is_closed_after(&self) -> bool {
        matches!(self, Self::Close)
    }
}
