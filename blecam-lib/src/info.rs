//! Messages delivered on the info characteristic.
//!
//! Every notification on that characteristic is one complete message whose
//! first byte classifies it:
//!
//! | kind | layout (little-endian)                                    |
//! |------|-----------------------------------------------------------|
//! | 0x01 | `u32` image size                                          |
//! | 0x02 | `u16` MTU, `u16` interval (1.25 ms units), tx PHY, rx PHY |
//!
//! Anything else is classified as [`InfoKind::Unknown`].

use crate::constants::{BLE_INFO_SIZE, IMAGE_INFO_SIZE};
use crate::error::Error;
use crate::link::BleParameters;
use num_enum::{FromPrimitive, IntoPrimitive};
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum InfoKind {
    #[num_enum(default)]
    Unknown = 0x00,
    ImageInfo = 0x01,
    BleInfo = 0x02,
}

/// ImageInfo wire layout (5 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ImageInfoRaw {
    pub kind: u8,
    pub image_size: U32,
}

/// BleInfo wire layout (7 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct BleInfoRaw {
    pub kind: u8,
    pub mtu: U16,
    pub interval_units: U16,
    pub tx_phy: u8,
    pub rx_phy: u8,
}

impl From<BleInfoRaw> for BleParameters {
    fn from(raw: BleInfoRaw) -> Self {
        BleParameters::from_raw(raw.mtu.get(), raw.interval_units.get(), raw.tx_phy, raw.rx_phy)
    }
}

/// A classified info message
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InfoMessage {
    /// Announces the size of the image that follows on the image characteristic
    ImageInfo { image_size: u32 },
    /// Current link parameters
    BleInfo(BleParameters),
    /// Unrecognized kind byte, or an empty message
    Unknown { code: Option<u8> },
}

impl InfoMessage {
    pub fn kind(&self) -> InfoKind {
        match self {
            InfoMessage::ImageInfo { .. } => InfoKind::ImageInfo,
            InfoMessage::BleInfo(_) => InfoKind::BleInfo,
            InfoMessage::Unknown { .. } => InfoKind::Unknown,
        }
    }

    /// Classify and decode an info message.
    ///
    /// Fails with [`Error::InsufficientData`] when a recognized kind is too
    /// short for its layout. Trailing bytes are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let Some(&code) = bytes.first() else {
            return Ok(InfoMessage::Unknown { code: None });
        };

        match InfoKind::from_primitive(code) {
            InfoKind::ImageInfo => {
                let (raw, _) = ImageInfoRaw::read_from_prefix(bytes).map_err(|_| Error::InsufficientData {
                    expected: IMAGE_INFO_SIZE,
                    actual: bytes.len(),
                })?;
                Ok(InfoMessage::ImageInfo {
                    image_size: raw.image_size.get(),
                })
            }
            InfoKind::BleInfo => {
                let (raw, _) = BleInfoRaw::read_from_prefix(bytes).map_err(|_| Error::InsufficientData {
                    expected: BLE_INFO_SIZE,
                    actual: bytes.len(),
                })?;
                Ok(InfoMessage::BleInfo(raw.into()))
            }
            InfoKind::Unknown => Ok(InfoMessage::Unknown { code: Some(code) }),
        }
    }
}

impl TryFrom<&[u8]> for InfoMessage {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        InfoMessage::parse(bytes)
    }
}
