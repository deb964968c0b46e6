//! # CRSF Protocol Constants and Types
//!
//! Frame layout, telemetry type codes and the decoded payload types.
//!
//! ```text
//! [address:1][length:1][type:1][payload:length-2][crc:1]
//! ```
//!
//! `length` counts the type byte, the payload and the crc.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::FrameError;

/// Maximum CRSF frame size (address + length + 62 bytes)
pub const CRSF_MAX_FRAME_SIZE: usize = 64;

/// Largest packet staged for extraction; longer datagrams are clamped
pub const CRSF_MAX_STAGED_PACKET_LEN: usize = CRSF_MAX_FRAME_SIZE + 4;

/// Smallest packet that can hold address, length, type and crc
pub const CRSF_MIN_PACKET_LEN: usize = 4;

/// Smallest valid length field (type + crc)
pub const CRSF_MIN_LENGTH_FIELD: u8 = 2;

/// GPS payload size
pub const CRSF_GPS_PAYLOAD_SIZE: usize = 15;

/// Battery Sensor payload size
pub const CRSF_BATTERY_SENSOR_PAYLOAD_SIZE: usize = 8;

/// Attitude payload size
pub const CRSF_ATTITUDE_PAYLOAD_SIZE: usize = 6;

/// GPS altitude is transmitted with a +1000 m offset
pub const CRSF_GPS_ALTITUDE_OFFSET_M: f32 = 1000.0;

/// Minimum satellite count for a trustworthy fix (4 sats can report bad altitude)
pub const GPS_MIN_SATELLITES_FOR_FIX: u8 = 5;

/// Radians to degrees
pub const RAD_TO_DEG: f32 = 57.295_779_5;

/// Capacity of the flight mode label in bytes
pub const FLIGHT_MODE_LABEL_CAPACITY: usize = 31;

/// Flight mode label reported while the motors are armed
pub const FLIGHT_MODE_ARMED: &str = "ARM";

/// Telemetry frame types decoded by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    Gps = 0x02,
    BatterySensor = 0x08,
    Attitude = 0x1E,
    FlightMode = 0x21,
}

impl FrameType {
    /// Look up a type code; unknown codes yield `None`
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x02 => Some(Self::Gps),
            0x08 => Some(Self::BatterySensor),
            0x1E => Some(Self::Attitude),
            0x21 => Some(Self::FlightMode),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Gps => "GPS",
            Self::BatterySensor => "BATTERY_SENSOR",
            Self::Attitude => "ATTITUDE",
            Self::FlightMode => "FLIGHT_MODE",
        }
    }
}

impl TryFrom<u8> for FrameType {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(FrameError::UnknownFrameType(code))
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), self.code())
    }
}

/// One frame as captured from the stream
///
/// Borrows the extractor's scratch storage and lives for a single decode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    /// Destination address, kept for diagnostics
    pub address: u8,
    /// Declared length field (type + payload + crc)
    pub length: u8,
    /// Raw type code
    pub frame_type: u8,
    /// Payload, clamped to the captured bytes
    pub payload: &'a [u8],
    /// Trailing checksum, `None` when the capture ended before it
    pub crc: Option<u8>,
}

impl RawFrame<'_> {
    /// Payload length announced by the length field
    pub fn declared_payload_len(&self) -> usize {
        usize::from(self.length.saturating_sub(CRSF_MIN_LENGTH_FIELD))
    }

    /// True when fewer payload bytes were captured than declared
    pub fn is_truncated(&self) -> bool {
        self.payload.len() < self.declared_payload_len()
    }
}

/// GPS telemetry data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsData {
    /// Raw latitude, degrees × 10^7
    pub latitude_raw: i32,
    /// Raw longitude, degrees × 10^7
    pub longitude_raw: i32,
    /// Raw ground speed, km/h × 10
    pub ground_speed_raw: u16,
    /// Raw course over ground, degrees × 100
    pub heading_raw: u16,
    /// Raw altitude, meters + 1000
    pub altitude_raw: u16,
    /// Number of satellites
    pub satellites: u8,
}

impl GpsData {
    pub fn latitude(&self) -> f64 {
        f64::from(self.latitude_raw) / 10_000_000.0
    }

    pub fn longitude(&self) -> f64 {
        f64::from(self.longitude_raw) / 10_000_000.0
    }

    /// Ground speed in km/h
    pub fn ground_speed(&self) -> f32 {
        f32::from(self.ground_speed_raw) / 10.0
    }

    /// Course over ground in degrees
    pub fn heading(&self) -> f32 {
        f32::from(self.heading_raw) / 100.0
    }

    /// Altitude in meters with the protocol offset removed
    pub fn altitude(&self) -> f32 {
        f32::from(self.altitude_raw) - CRSF_GPS_ALTITUDE_OFFSET_M
    }

    pub fn has_fix(&self) -> bool {
        self.satellites >= GPS_MIN_SATELLITES_FOR_FIX
    }
}

/// Battery sensor telemetry data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatterySensor {
    /// Voltage in deci-volts
    pub voltage_dv: u16,
    /// Current in deci-amps
    pub current_da: u16,
    /// Consumed capacity in mAh (24-bit)
    pub capacity_used: u32,
    /// Battery remaining percentage
    pub remaining_percent: u8,
}

impl BatterySensor {
    pub fn voltage(&self) -> f32 {
        f32::from(self.voltage_dv) / 10.0
    }

    pub fn current(&self) -> f32 {
        f32::from(self.current_da) / 10.0
    }

    /// Consumed capacity saturated to the 16-bit telemetry field
    pub fn capacity_used_u16(&self) -> u16 {
        u16::try_from(self.capacity_used).unwrap_or(u16::MAX)
    }
}

/// Attitude telemetry data, raw radians × 10000
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attitude {
    pub pitch_raw: i16,
    pub roll_raw: i16,
    pub yaw_raw: i16,
}

impl Attitude {
    pub fn pitch_deg(&self) -> f32 {
        raw_to_degrees(self.pitch_raw)
    }

    pub fn roll_deg(&self) -> f32 {
        raw_to_degrees(self.roll_raw)
    }

    pub fn yaw_deg(&self) -> f32 {
        raw_to_degrees(self.yaw_raw)
    }
}

fn raw_to_degrees(raw: i16) -> f32 {
    (f32::from(raw) / 10_000.0) * RAD_TO_DEG
}

/// Bounded flight mode text with an explicit used length
///
/// Holds at most [`FLIGHT_MODE_LABEL_CAPACITY`] bytes. Longer input is
/// truncated silently.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeLabel {
    bytes: [u8; FLIGHT_MODE_LABEL_CAPACITY],
    len: u8,
}

impl ModeLabel {
    pub const fn empty() -> Self {
        Self {
            bytes: [0; FLIGHT_MODE_LABEL_CAPACITY],
            len: 0,
        }
    }

    /// Build a label from raw bytes, keeping the run before the first NUL
    pub fn from_bytes(raw: &[u8]) -> Self {
        let text = raw.split(|&b| b == 0).next().unwrap_or_default();
        let len = text.len().min(FLIGHT_MODE_LABEL_CAPACITY);

        let mut label = Self::empty();
        label.bytes[..len].copy_from_slice(&text[..len]);
        label.len = len as u8;
        label
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Exact byte equality with `text`
    pub fn matches(&self, text: &str) -> bool {
        self.as_bytes() == text.as_bytes()
    }
}

impl fmt::Debug for ModeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModeLabel({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for ModeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl Serialize for ModeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

/// Flight mode telemetry data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightMode {
    pub label: ModeLabel,
}

impl FlightMode {
    pub fn is_armed(&self) -> bool {
        self.label.matches(FLIGHT_MODE_ARMED)
    }
}
