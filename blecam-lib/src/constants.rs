// Protocol constants for the BLE camera image service

/// Primary image transfer service
pub const IMAGE_SERVICE_UUID: &str = "6E400001-B5A3-F393-E0A9-E50E24DCCA3E";

/// Command characteristic (write without response)
pub const IMAGE_RX_CHARACTERISTIC_UUID: &str = "6E400002-B5A3-F393-E0A9-E50E24DCCA3E";

/// Image data characteristic (notify)
pub const IMAGE_TX_CHARACTERISTIC_UUID: &str = "6E400003-B5A3-F393-E0A9-E50E24DCCA3E";

/// Info characteristic (notify)
pub const IMAGE_INFO_CHARACTERISTIC_UUID: &str = "6E400004-B5A3-F393-E0A9-E50E24DCCA3E";

/// Size of an ImageInfo message: kind byte + u32 image length
pub const IMAGE_INFO_SIZE: usize = 5;

/// Size of a BleInfo message: kind + u16 MTU + u16 interval + tx/rx PHY
pub const BLE_INFO_SIZE: usize = 7;

/// One connection interval unit in milliseconds
pub const CONNECTION_INTERVAL_UNIT_MS: f32 = 1.25;
