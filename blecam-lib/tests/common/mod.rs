//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use blecam_lib::{
    BleParameters, CameraSession, Command, ManualClock, Phy, Resolution, SessionEvent, SubChannel, TransferEngine,
    TransferEvent, TransferState, TransportError,
};
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use hex;
#[allow(unused_imports)]
pub use std::time::Duration;

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    Bytes::from(hex::decode(hex_data).expect("Failed to decode hex"))
}

/// ImageInfo message announcing `size` bytes
#[allow(dead_code)]
pub fn image_info(size: u32) -> Vec<u8> {
    let mut msg = vec![0x01];
    msg.extend_from_slice(&size.to_le_bytes());
    msg
}

/// Deterministic image payload; starts with a JPEG SOI marker
#[allow(dead_code)]
pub fn fake_image(len: usize) -> Vec<u8> {
    let mut image: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
    if len >= 2 {
        image[0] = 0xFF;
        image[1] = 0xD8;
    }
    image
}

/// Real BleInfo notification: MTU 247, 15ms interval, LE 2M both ways
#[allow(dead_code)]
pub const BLE_INFO_2M: &str = "02f7000c000202";

#[allow(dead_code)]
pub fn test_engine() -> (TransferEngine<Vec<TransferEvent>, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    (TransferEngine::with_clock(Vec::new(), clock.clone()), clock)
}

#[allow(dead_code)]
pub fn progress_fractions(events: &[TransferEvent]) -> Vec<f32> {
    events
        .iter()
        .filter_map(|e| match e {
            TransferEvent::TransferProgress { fraction, .. } => Some(*fraction),
            _ => None,
        })
        .collect()
}

#[allow(dead_code)]
pub fn completed_images(events: &[TransferEvent]) -> Vec<Bytes> {
    events
        .iter()
        .filter_map(|e| match e {
            TransferEvent::TransferComplete { image, .. } => Some(image.clone()),
            _ => None,
        })
        .collect()
}
