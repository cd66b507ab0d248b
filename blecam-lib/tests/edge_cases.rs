//! Tests for edge cases and error handling

mod common;

use blecam_lib::{Error, InfoMessage};
use common::*;

#[test]
fn test_short_image_info_is_ignored() {
    let test_cases = vec![
        (vec![0x01], "kind only"),
        (vec![0x01, 0x10], "1 size byte"),
        (vec![0x01, 0x10, 0x27], "2 size bytes"),
        (vec![0x01, 0x10, 0x27, 0x00], "3 size bytes"),
    ];

    for (message, description) in test_cases {
        let (mut engine, _clock) = test_engine();
        engine.handle_info(&message);
        assert_eq!(engine.state(), TransferState::Idle, "{}", description);
        assert!(engine.sink().is_empty(), "{}: expected no events", description);

        // a following fragment has nothing to attach to
        engine.handle_image(&[0u8; 4]);
        assert!(engine.sink().is_empty(), "{}: fragment should be dropped", description);
    }
}

#[test]
fn test_short_ble_info_is_ignored() {
    let (mut engine, _clock) = test_engine();
    for len in 1..7 {
        let full = hex_to_bytes(BLE_INFO_2M);
        engine.handle_info(&full[..len]);
    }
    assert!(engine.sink().is_empty());
}

#[test]
fn test_short_info_reports_expected_length() {
    match InfoMessage::parse(&[0x02, 0x00]) {
        Err(Error::InsufficientData { expected, actual }) => {
            assert_eq!(expected, 7);
            assert_eq!(actual, 2);
        }
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_unknown_info_kind_drops_partial_image_but_keeps_transfer() {
    let (mut engine, _clock) = test_engine();
    engine.handle_info(&image_info(10));
    engine.handle_image(&[0u8; 5]);
    assert_eq!(engine.received(), 5);

    engine.handle_info(&[0x00, 0x01, 0x02, 0x03, 0x04]);
    engine.handle_info(&[0x09]);
    engine.handle_info(&[]);

    assert_eq!(engine.received(), 0);
    assert_eq!(engine.state(), TransferState::AwaitingImage);
    assert_eq!(engine.expected_size(), 10);
    // only the progress event from the fragment
    assert_eq!(engine.sink().len(), 1);

    // a full image's worth of fresh fragments still completes
    engine.handle_image(&[0u8; 10]);
    assert_eq!(completed_images(engine.sink()).len(), 1);
}

#[test]
fn test_info_after_completion_returns_to_idle() {
    let (mut engine, _clock) = test_engine();
    engine.handle_info(&image_info(2));
    engine.handle_image(&[1, 2]);
    assert_eq!(engine.state(), TransferState::Complete);

    engine.handle_info(&hex_to_bytes(BLE_INFO_2M));
    assert_eq!(engine.state(), TransferState::Idle);
}

#[test]
fn test_unknown_phy_codes_fall_back_to_le1m() {
    let (mut engine, _clock) = test_engine();
    engine.handle_info(&[0x02, 0x17, 0x00, 0x50, 0x00, 0x00, 0x07]);

    assert_eq!(
        engine.sink()[0],
        TransferEvent::LinkParametersUpdated(BleParameters {
            mtu: 23,
            connection_interval_ms: 100.0,
            tx_phy: Phy::Le1M,
            rx_phy: Phy::Le1M,
        })
    );
}

#[test]
fn test_trailing_bytes_after_info_are_ignored() {
    let (mut engine, _clock) = test_engine();
    engine.handle_info(&[0x01, 0x03, 0x00, 0x00, 0x00, 0xEE, 0xEE]);
    assert_eq!(engine.expected_size(), 3);
    assert_eq!(engine.state(), TransferState::AwaitingImage);
}

#[test]
fn test_fragment_after_completion_is_dropped() {
    let (mut engine, _clock) = test_engine();
    engine.handle_info(&image_info(2));
    engine.handle_image(&[1, 2]);
    assert_eq!(engine.state(), TransferState::Complete);

    engine.handle_image(&[3, 4]);
    assert_eq!(engine.state(), TransferState::Idle);
    assert_eq!(completed_images(engine.sink()).len(), 1);
    assert_eq!(engine.sink().len(), 2);
}

#[test]
fn test_stop_discards_in_flight_image() {
    let (mut engine, _clock) = test_engine();
    engine.handle_info(&image_info(100));
    engine.handle_image(&[0u8; 60]);
    engine.stop();

    engine.handle_image(&[0u8; 40]);
    assert!(completed_images(engine.sink()).is_empty());
    assert_eq!(engine.state(), TransferState::Idle);
}

#[test]
fn test_reset_clears_counters() {
    let (mut engine, clock) = test_engine();
    engine.begin_stream();
    engine.handle_info(&image_info(1));
    clock.advance(Duration::from_millis(10));
    engine.handle_image(&[0]);
    assert_eq!(engine.frame_count(), 1);

    engine.reset();
    assert_eq!(engine.frame_count(), 0);
    assert_eq!(engine.expected_size(), 0);
    assert_eq!(engine.transfer_rate_kbps(), 0.0);
    assert_eq!(engine.state(), TransferState::Idle);
}
