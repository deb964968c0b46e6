//! Snapshot types exposed to telemetry readers.

use serde::Serialize;

use crate::crsf::protocol::ModeLabel;

/// Attitude in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AttitudeState {
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

/// Latest battery sensor reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BatteryState {
    /// Voltage in deci-volts
    pub voltage_dv: u16,
    /// Current in deci-amps
    pub current_da: u16,
    /// Voltage in volts
    pub volts: f32,
    /// Current in amperes
    pub amps: f32,
    /// Consumed capacity as reported (24-bit, mAh)
    pub capacity_used: u32,
    /// Consumed capacity saturated to 16 bits (mAh)
    pub consumed_mah: u16,
    pub remaining_percent: u8,
}

/// Latest GPS reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GpsState {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters, offset removed
    pub altitude: f32,
    /// km/h
    pub ground_speed: f32,
    /// GPS course in degrees. Not used as heading, attitude yaw is.
    pub course: f32,
    pub satellites: u8,
}

/// A geographic position with heading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub alt: f32,
    pub heading: f32,
    /// Altitude above the stored home, 0 until home is stored
    pub alt_above_ground: f32,
}

/// Current location plus the latched home
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PositionState {
    pub current: Location,
    pub home: Location,
    /// One-shot latch, set externally via `store_home`
    pub home_stored: bool,
}

/// Derived GPS status flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusFlags {
    pub gps_fix_good: bool,
    pub longitude_good: bool,
    pub latitude_good: bool,
    pub altitude_good: bool,
    pub heading_good: bool,
    /// fix ∧ longitude ∧ latitude ∧ altitude, refreshed on flight mode frames
    pub gps_good: bool,
    /// Milliseconds since bridge start of the last `gps_good` evaluation that passed
    pub last_good_gps_ms: Option<u64>,
}

/// Latest decoded value of every telemetry field
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub attitude: AttitudeState,
    pub battery: BatteryState,
    pub gps: GpsState,
    pub flight_mode: ModeLabel,
    pub armed: bool,
    pub position: PositionState,
    pub status: StatusFlags,
}
