use crate::constants::CONNECTION_INTERVAL_UNIT_MS;
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Radio PHY of the link.
///
/// Codes are the values the camera reports. Unknown codes fall back to LE 1M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, IntoPrimitive, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Phy {
    #[default]
    #[strum(to_string = "LE 1M")]
    Le1M = 0x01,
    #[strum(to_string = "LE 2M")]
    Le2M = 0x02,
}

impl Phy {
    /// Parameter byte for the ChangePhy command.
    ///
    /// The camera takes 0 for LE 1M and 1 for LE 2M on the command path,
    /// while reporting 1 and 2 in link parameter updates.
    pub fn command_code(&self) -> u8 {
        let code: u8 = (*self).into();
        code - 1
    }

    pub fn toggled(&self) -> Phy {
        match self {
            Phy::Le1M => Phy::Le2M,
            Phy::Le2M => Phy::Le1M,
        }
    }
}

/// Link parameters reported by the camera in a BleInfo message
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BleParameters {
    pub mtu: u16,
    pub connection_interval_ms: f32,
    pub tx_phy: Phy,
    pub rx_phy: Phy,
}

impl BleParameters {
    /// Build from raw wire fields: interval in 1.25 ms units, PHY codes as reported.
    pub fn from_raw(mtu: u16, interval_units: u16, tx_phy: u8, rx_phy: u8) -> Self {
        Self {
            mtu,
            connection_interval_ms: interval_units as f32 * CONNECTION_INTERVAL_UNIT_MS,
            tx_phy: Phy::from_primitive(tx_phy),
            rx_phy: Phy::from_primitive(rx_phy),
        }
    }
}
