use crate::constants::{
    IMAGE_INFO_CHARACTERISTIC_UUID, IMAGE_RX_CHARACTERISTIC_UUID, IMAGE_SERVICE_UUID, IMAGE_TX_CHARACTERISTIC_UUID,
};
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The three logical channels of a camera session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SubChannel {
    #[strum(to_string = "command-write")]
    CommandWrite,
    #[strum(to_string = "image-notify")]
    ImageNotify,
    #[strum(to_string = "info-notify")]
    InfoNotify,
}

/// GATT layout of the image service: which characteristic backs which sub-channel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServiceLayout {
    pub service: String,
    pub command_write: String,
    pub image_notify: String,
    pub info_notify: String,
}

impl ServiceLayout {
    /// Resolve a characteristic UUID (case-insensitive) to its sub-channel
    pub fn channel_for(&self, uuid: &str) -> Option<SubChannel> {
        [
            (&self.command_write, SubChannel::CommandWrite),
            (&self.image_notify, SubChannel::ImageNotify),
            (&self.info_notify, SubChannel::InfoNotify),
        ]
        .into_iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(uuid))
        .map(|(_, channel)| channel)
    }

    pub fn uuid_for(&self, channel: SubChannel) -> &str {
        match channel {
            SubChannel::CommandWrite => &self.command_write,
            SubChannel::ImageNotify => &self.image_notify,
            SubChannel::InfoNotify => &self.info_notify,
        }
    }
}

impl Default for ServiceLayout {
    fn default() -> Self {
        Self {
            service: IMAGE_SERVICE_UUID.to_string(),
            command_write: IMAGE_RX_CHARACTERISTIC_UUID.to_string(),
            image_notify: IMAGE_TX_CHARACTERISTIC_UUID.to_string(),
            info_notify: IMAGE_INFO_CHARACTERISTIC_UUID.to_string(),
        }
    }
}
