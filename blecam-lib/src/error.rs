use crate::command::Opcode;
use crate::config::SubChannel;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Failures reported by the transport session collaborator.
///
/// The engine never produces these itself; it only relays them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransportError {
    #[error("notification failed on {channel}: {reason}")]
    Read { channel: SubChannel, reason: String },

    #[error("command write failed: {0}")]
    Write(String),

    #[error("session disconnected")]
    Disconnected,
}

/// The primary error type for the `blecam-lib` library.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Image overflow: declared {expected} bytes, received {received}")]
    ImageOverflow { expected: u32, received: usize },

    #[error("Command {0:?} requires a parameter byte")]
    MissingParameter(Opcode),

    #[error("Invalid packet: {0}")]
    InvalidPacket(String),
}
