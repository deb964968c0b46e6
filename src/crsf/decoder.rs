//! # CRSF Telemetry Decoder
//!
//! Pure payload decoders for GPS, Battery Sensor, Attitude and Flight Mode
//! frames, plus the dispatch table keyed by frame type.
//!
//! Every decoder checks its minimum payload length first. A short payload
//! yields [`FrameError::PayloadTooShort`] and nothing is decoded, so a garbled
//! frame is dropped whole instead of being partially applied.

use super::protocol::*;
use crate::error::FrameError;

/// A decoded telemetry frame, ready to be applied to the state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryUpdate {
    Gps(GpsData),
    Battery(BatterySensor),
    Attitude(Attitude),
    FlightMode(FlightMode),
}

impl TelemetryUpdate {
    pub fn frame_type(&self) -> FrameType {
        match self {
            Self::Gps(_) => FrameType::Gps,
            Self::Battery(_) => FrameType::BatterySensor,
            Self::Attitude(_) => FrameType::Attitude,
            Self::FlightMode(_) => FrameType::FlightMode,
        }
    }
}

/// One entry of the dispatch table
#[derive(Clone, Copy)]
pub struct FrameDecoder {
    pub frame_type: FrameType,
    /// Minimum payload length accepted by `decode`
    pub min_payload: usize,
    pub decode: fn(&[u8]) -> Result<TelemetryUpdate, FrameError>,
}

/// Decoders for every supported frame type
pub static DECODERS: [FrameDecoder; 4] = [
    FrameDecoder {
        frame_type: FrameType::Gps,
        min_payload: CRSF_GPS_PAYLOAD_SIZE,
        decode: gps_update,
    },
    FrameDecoder {
        frame_type: FrameType::BatterySensor,
        min_payload: CRSF_BATTERY_SENSOR_PAYLOAD_SIZE,
        decode: battery_update,
    },
    FrameDecoder {
        frame_type: FrameType::Attitude,
        min_payload: CRSF_ATTITUDE_PAYLOAD_SIZE,
        decode: attitude_update,
    },
    FrameDecoder {
        frame_type: FrameType::FlightMode,
        min_payload: 0,
        decode: flight_mode_update,
    },
];

/// Find the decoder registered for a raw type code
pub fn decoder_for(code: u8) -> Option<&'static FrameDecoder> {
    DECODERS.iter().find(|d| d.frame_type.code() == code)
}

/// Decode a payload according to its frame type code
///
/// # Errors
///
/// - `UnknownFrameType` if no decoder is registered for `code`
/// - `PayloadTooShort` if the payload is shorter than the type's layout
pub fn decode_payload(code: u8, payload: &[u8]) -> Result<TelemetryUpdate, FrameError> {
    let decoder = decoder_for(code).ok_or(FrameError::UnknownFrameType(code))?;
    (decoder.decode)(payload)
}

/// Decode a frame captured by the extractor
pub fn decode_frame(frame: &RawFrame<'_>) -> Result<TelemetryUpdate, FrameError> {
    decode_payload(frame.frame_type, frame.payload)
}

fn ensure_len(frame_type: FrameType, payload: &[u8], min: usize) -> Result<(), FrameError> {
    if payload.len() < min {
        return Err(FrameError::PayloadTooShort {
            frame_type: frame_type.name(),
            len: payload.len(),
            min,
        });
    }
    Ok(())
}

fn be_u16(payload: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([payload[at], payload[at + 1]])
}

fn be_i16(payload: &[u8], at: usize) -> i16 {
    i16::from_be_bytes([payload[at], payload[at + 1]])
}

fn be_i32(payload: &[u8], at: usize) -> i32 {
    i32::from_be_bytes([payload[at], payload[at + 1], payload[at + 2], payload[at + 3]])
}

/// Decode GPS telemetry packet
///
/// Layout (big-endian): latitude i32, longitude i32, ground speed u16,
/// heading u16, altitude u16, satellites u8.
pub fn decode_gps(payload: &[u8]) -> Result<GpsData, FrameError> {
    ensure_len(FrameType::Gps, payload, CRSF_GPS_PAYLOAD_SIZE)?;

    Ok(GpsData {
        latitude_raw: be_i32(payload, 0),
        longitude_raw: be_i32(payload, 4),
        ground_speed_raw: be_u16(payload, 8),
        heading_raw: be_u16(payload, 10),
        altitude_raw: be_u16(payload, 12),
        satellites: payload[14],
    })
}

/// Decode Battery Sensor telemetry packet
///
/// Layout (big-endian): voltage u16 (dV), current u16 (dA),
/// consumed capacity u24 (mAh), remaining u8 (%).
pub fn decode_battery_sensor(payload: &[u8]) -> Result<BatterySensor, FrameError> {
    ensure_len(FrameType::BatterySensor, payload, CRSF_BATTERY_SENSOR_PAYLOAD_SIZE)?;

    Ok(BatterySensor {
        voltage_dv: be_u16(payload, 0),
        current_da: be_u16(payload, 2),
        capacity_used: u32::from_be_bytes([0, payload[4], payload[5], payload[6]]),
        remaining_percent: payload[7],
    })
}

/// Decode Attitude telemetry packet
///
/// Three big-endian i16 values (pitch, roll, yaw) in radians × 10000.
pub fn decode_attitude(payload: &[u8]) -> Result<Attitude, FrameError> {
    ensure_len(FrameType::Attitude, payload, CRSF_ATTITUDE_PAYLOAD_SIZE)?;

    Ok(Attitude {
        pitch_raw: be_i16(payload, 0),
        roll_raw: be_i16(payload, 2),
        yaw_raw: be_i16(payload, 4),
    })
}

/// Decode Flight Mode telemetry packet
///
/// Never fails: an empty payload decodes to an empty label.
pub fn decode_flight_mode(payload: &[u8]) -> Result<FlightMode, FrameError> {
    Ok(FlightMode {
        label: ModeLabel::from_bytes(payload),
    })
}

fn gps_update(payload: &[u8]) -> Result<TelemetryUpdate, FrameError> {
    decode_gps(payload).map(TelemetryUpdate::Gps)
}

fn battery_update(payload: &[u8]) -> Result<TelemetryUpdate, FrameError> {
    decode_battery_sensor(payload).map(TelemetryUpdate::Battery)
}

fn attitude_update(payload: &[u8]) -> Result<TelemetryUpdate, FrameError> {
    decode_attitude(payload).map(TelemetryUpdate::Attitude)
}

fn flight_mode_update(payload: &[u8]) -> Result<TelemetryUpdate, FrameError> {
    decode_flight_mode(payload).map(TelemetryUpdate::FlightMode)
}
