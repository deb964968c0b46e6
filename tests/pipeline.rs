//! End-to-end tests: raw datagrams in, telemetry snapshot out.

use std::time::{Duration, Instant};

use crsf_telemetry_bridge::bridge::TelemetryBridge;
use crsf_telemetry_bridge::config::CrsfConfig;
use crsf_telemetry_bridge::crsf::crc::frame_crc;
use crsf_telemetry_bridge::crsf::protocol::FrameType;
use crsf_telemetry_bridge::error::FrameError;
use crsf_telemetry_bridge::telemetry::TelemetryState;
use crsf_telemetry_bridge::transport::{strip_transport_header, DEFAULT_HEADER_LEN};

fn frame(frame_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xC8, (payload.len() + 2) as u8, frame_type];
    bytes.extend_from_slice(payload);
    bytes.push(frame_crc(frame_type, payload));
    bytes
}

fn gps_payload(lat: i32, lon: i32, alt_raw: u16, sats: u8) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&lat.to_be_bytes());
    payload.extend_from_slice(&lon.to_be_bytes());
    payload.extend_from_slice(&55u16.to_be_bytes());
    payload.extend_from_slice(&4500u16.to_be_bytes());
    payload.extend_from_slice(&alt_raw.to_be_bytes());
    payload.push(sats);
    payload
}

fn new_bridge(t0: Instant) -> TelemetryBridge {
    TelemetryBridge::with_state(&CrsfConfig::default(), TelemetryState::with_epoch(t0))
}

#[test]
fn test_backpack_datagram_roundtrip() {
    let mut bridge = TelemetryBridge::new(&CrsfConfig::default());

    let mut datagram = vec![b'$', b'X', b'<', 0x00, 0x11, 0x00, 0x0A, 0x00];
    datagram.extend(frame(0x21, b"ARM\0"));

    let packet = strip_transport_header(&datagram, DEFAULT_HEADER_LEN).unwrap();
    assert_eq!(bridge.handle_packet(packet), Ok(FrameType::FlightMode));
    assert!(bridge.snapshot().armed);
    assert_eq!(bridge.snapshot().flight_mode.to_string(), "ARM");
}

#[test]
fn test_full_flight_sequence() {
    let t0 = Instant::now();
    let mut bridge = new_bridge(t0);
    let mut rx = bridge.subscribe();

    bridge
        .handle_packet_at(&frame(0x02, &gps_payload(507_000_000, 306_000_000, 1200, 10)), t0)
        .unwrap();
    bridge
        .handle_packet_at(&frame(0x1E, &[0x03, 0xE8, 0xFE, 0x0C, 0x07, 0xD0]), t0)
        .unwrap();
    bridge
        .handle_packet_at(&frame(0x08, &[0x00, 0x9C, 0x00, 0x32, 0x00, 0x02, 0x58, 0x5A]), t0)
        .unwrap();
    bridge
        .handle_packet_at(&frame(0x21, b"ARM"), t0 + Duration::from_millis(750))
        .unwrap();

    let snapshot = *rx.borrow_and_update();
    assert_eq!(snapshot, *bridge.snapshot());

    assert!((snapshot.gps.latitude - 50.7).abs() < 1e-6);
    assert!((snapshot.gps.longitude - 30.6).abs() < 1e-6);
    assert_eq!(snapshot.gps.altitude, 200.0);
    assert!((snapshot.gps.ground_speed - 5.5).abs() < 0.001);
    assert_eq!(snapshot.gps.satellites, 10);

    assert!((snapshot.attitude.yaw - 11.4592).abs() < 0.001);
    assert_eq!(snapshot.position.current.heading, snapshot.attitude.yaw);

    assert!((snapshot.battery.volts - 15.6).abs() < 0.001);
    assert!((snapshot.battery.amps - 5.0).abs() < 0.001);
    assert_eq!(snapshot.battery.consumed_mah, 600);
    assert_eq!(snapshot.battery.remaining_percent, 90);

    assert!(snapshot.armed);
    assert!(snapshot.status.gps_good);
    assert_eq!(snapshot.status.last_good_gps_ms, Some(750));
    assert_eq!(snapshot.position.current.alt_above_ground, 0.0);
}

#[test]
fn test_home_latch_and_altitude_above_ground() {
    let t0 = Instant::now();
    let mut bridge = new_bridge(t0);

    bridge
        .handle_packet_at(&frame(0x02, &gps_payload(1, 1, 1100, 8)), t0)
        .unwrap();
    assert!(bridge.store_home());

    bridge
        .handle_packet_at(&frame(0x02, &gps_payload(1, 1, 1145, 8)), t0)
        .unwrap();
    assert_eq!(bridge.snapshot().position.current.alt_above_ground, 45.0);
    assert!(!bridge.store_home());
}

#[test]
fn test_gps_good_requires_every_flag() {
    let t0 = Instant::now();
    let mut bridge = new_bridge(t0);

    // Longitude reads zero
    bridge
        .handle_packet_at(&frame(0x02, &gps_payload(1, 0, 1100, 12)), t0)
        .unwrap();
    bridge
        .handle_packet_at(&frame(0x21, b"ANGL"), t0 + Duration::from_secs(1))
        .unwrap();

    assert!(!bridge.snapshot().status.gps_good);
    assert_eq!(bridge.snapshot().status.last_good_gps_ms, None);
}

#[test]
fn test_line_noise_never_corrupts_state() {
    let t0 = Instant::now();
    let mut bridge = new_bridge(t0);
    bridge.handle_packet_at(&frame(0x21, b"ARM"), t0).unwrap();
    bridge
        .handle_packet_at(&frame(0x08, &[0x00, 0x64, 0x00, 0x0A, 0x00, 0x00, 0x64, 0x32]), t0)
        .unwrap();
    let before = *bridge.snapshot();

    let noise: [&[u8]; 6] = [
        &[],
        &[0xC8],
        &[0xC8, 0x01, 0x21, 0x00],
        &[0xC8, 0x00, 0x08, 0xFF, 0xFF],
        &[0xC8, 0x0A, 0x08, 0x01, 0x02],
        &[0x00, 0x0C, 0x14, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x00],
    ];
    for packet in noise {
        assert!(bridge.handle_packet_at(packet, t0).is_err());
    }

    assert_eq!(*bridge.snapshot(), before);
    assert_eq!(bridge.stats().decoded, 2);
}

#[test]
fn test_error_taxonomy() {
    let mut bridge = TelemetryBridge::new(&CrsfConfig::default());

    assert_eq!(
        bridge.handle_packet(&[0xC8, 0x02]),
        Err(FrameError::TransportTruncated { len: 2 })
    );
    assert_eq!(
        bridge.handle_packet(&[0xC8, 0x01, 0x21, 0x00]),
        Err(FrameError::InvalidLength { length: 1 })
    );
    assert!(matches!(
        bridge.handle_packet(&frame(0x02, &[0u8; 10])),
        Err(FrameError::PayloadTooShort { frame_type: "GPS", len: 10, min: 15 })
    ));
    assert_eq!(
        bridge.handle_packet(&frame(0x29, &[0u8; 4])),
        Err(FrameError::UnknownFrameType(0x29))
    );
}

#[test]
fn test_snapshot_serializes_to_json() {
    let mut bridge = TelemetryBridge::new(&CrsfConfig::default());
    bridge.handle_packet(&frame(0x21, b"WFSR")).unwrap();

    let json = serde_json::to_value(bridge.snapshot()).unwrap();
    assert_eq!(json["flight_mode"], "WFSR");
    assert_eq!(json["armed"], false);
    assert_eq!(json["status"]["last_good_gps_ms"], serde_json::Value::Null);
    assert_eq!(json["position"]["home_stored"], false);
}
