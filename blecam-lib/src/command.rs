use crate::error::Error;
use crate::link::Phy;
use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opcodes understood by the camera on the command characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Opcode {
    NoCommand = 0x00,
    StartSingleCapture = 0x01,
    StartStreaming = 0x02,
    StopStreaming = 0x03,
    ChangeResolution = 0x04,
    ChangePhy = 0x05,
    SendBleParameters = 0x06,
}

impl Opcode {
    /// Whether the opcode is followed by a one-byte parameter on the wire
    pub fn has_parameter(&self) -> bool {
        matches!(self, Opcode::ChangeResolution | Opcode::ChangePhy)
    }
}

/// Capture resolutions, in the order the camera cycles through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Resolution {
    #[strum(to_string = "160x120")]
    R160x120 = 0x01,
    #[strum(to_string = "320x240")]
    R320x240 = 0x02,
    #[strum(to_string = "640x480")]
    R640x480 = 0x03,
    #[strum(to_string = "800x600")]
    R800x600 = 0x04,
    #[strum(to_string = "1024x768")]
    R1024x768 = 0x05,
    #[strum(to_string = "1600x1200")]
    R1600x1200 = 0x06,
}

// Manual impl: a `#[default]` variant would make TryFromPrimitive map unknown codes to it
impl Default for Resolution {
    fn default() -> Self {
        Resolution::R160x120
    }
}

impl Resolution {
    pub const ALL: [Resolution; 6] = [
        Resolution::R160x120,
        Resolution::R320x240,
        Resolution::R640x480,
        Resolution::R800x600,
        Resolution::R1024x768,
        Resolution::R1600x1200,
    ];

    /// Width and height in pixels
    pub fn dimensions(&self) -> (u16, u16) {
        match self {
            Resolution::R160x120 => (160, 120),
            Resolution::R320x240 => (320, 240),
            Resolution::R640x480 => (640, 480),
            Resolution::R800x600 => (800, 600),
            Resolution::R1024x768 => (1024, 768),
            Resolution::R1600x1200 => (1600, 1200),
        }
    }

    /// The next resolution in cycling order; the largest wraps to the smallest.
    pub fn next(&self) -> Resolution {
        let idx = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// A high-level request written to the command characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    NoCommand,
    StartSingleCapture,
    StartStreaming,
    StopStreaming,
    ChangeResolution(Resolution),
    ChangePhy(Phy),
    SendBleParameters,
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::NoCommand => Opcode::NoCommand,
            Command::StartSingleCapture => Opcode::StartSingleCapture,
            Command::StartStreaming => Opcode::StartStreaming,
            Command::StopStreaming => Opcode::StopStreaming,
            Command::ChangeResolution(_) => Opcode::ChangeResolution,
            Command::ChangePhy(_) => Opcode::ChangePhy,
            Command::SendBleParameters => Opcode::SendBleParameters,
        }
    }

    /// Wire form of the command
    pub fn encode(&self) -> Bytes {
        let opcode: u8 = self.opcode().into();
        match self {
            Command::ChangeResolution(resolution) => Bytes::copy_from_slice(&[opcode, (*resolution).into()]),
            Command::ChangePhy(phy) => Bytes::copy_from_slice(&[opcode, phy.command_code()]),
            _ => Bytes::copy_from_slice(&[opcode]),
        }
    }
}

impl From<Command> for Bytes {
    fn from(command: Command) -> Self {
        command.encode()
    }
}

/// Encode a command from its raw opcode and optional parameter code.
///
/// The parameter is required for `ChangeResolution` and `ChangePhy` and
/// ignored otherwise. For `ChangePhy` it is the reported PHY code (1 or 2),
/// which goes out on the wire decremented by one.
pub fn encode(opcode: Opcode, parameter: Option<u8>) -> Result<Bytes, Error> {
    let code: u8 = opcode.into();
    if !opcode.has_parameter() {
        return Ok(Bytes::copy_from_slice(&[code]));
    }

    let parameter = parameter.ok_or(Error::MissingParameter(opcode))?;
    let wire = match opcode {
        Opcode::ChangePhy => parameter.saturating_sub(1),
        _ => parameter,
    };
    Ok(Bytes::copy_from_slice(&[code, wire]))
}
