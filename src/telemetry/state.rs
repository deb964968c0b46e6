//! # Telemetry State
//!
//! Applies decoded frames to the latest-value snapshot and keeps the derived
//! flags in step.
//!
//! Ordering matters across frame types:
//! - GPS frames refresh the per-field good flags and altitude above ground.
//! - Flight mode frames, the highest-rate status frame, fold those flags into
//!   `gps_good` and stamp the last good time.
//! - Attitude yaw is the heading. The GPS course never overwrites it.

use std::time::Instant;

use tracing::debug;

use super::types::*;
use crate::crsf::decoder::TelemetryUpdate;
use crate::crsf::protocol::{Attitude, BatterySensor, FlightMode, GpsData};

/// Owner of the telemetry snapshot; the single writer
#[derive(Debug, Clone)]
pub struct TelemetryState {
    snapshot: TelemetrySnapshot,
    /// Reference point for `last_good_gps_ms`
    epoch: Instant,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::with_epoch(Instant::now())
    }

    /// Create a state whose timestamps are measured from `epoch`
    pub fn with_epoch(epoch: Instant) -> Self {
        Self {
            snapshot: TelemetrySnapshot::default(),
            epoch,
        }
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Apply one decoded frame at time `now`
    pub fn apply(&mut self, update: &TelemetryUpdate, now: Instant) {
        match update {
            TelemetryUpdate::Gps(gps) => self.apply_gps(gps),
            TelemetryUpdate::Battery(battery) => self.apply_battery(battery),
            TelemetryUpdate::Attitude(attitude) => self.apply_attitude(attitude),
            TelemetryUpdate::FlightMode(mode) => self.apply_flight_mode(mode, now),
        }
    }

    /// Latch the current location as home
    ///
    /// One-shot: returns `false` and leaves home untouched if it was already
    /// stored.
    pub fn store_home(&mut self) -> bool {
        let position = &mut self.snapshot.position;
        if position.home_stored {
            return false;
        }

        position.home = position.current;
        position.home_stored = true;
        true
    }

    fn apply_gps(&mut self, gps: &GpsData) {
        let snapshot = &mut self.snapshot;

        snapshot.gps = GpsState {
            latitude: gps.latitude(),
            longitude: gps.longitude(),
            altitude: gps.altitude(),
            ground_speed: gps.ground_speed(),
            course: gps.heading(),
            satellites: gps.satellites,
        };

        let position = &mut snapshot.position;
        position.current.lat = gps.latitude();
        position.current.lon = gps.longitude();
        position.current.alt = gps.altitude();
        position.current.alt_above_ground = if position.home_stored {
            position.current.alt - position.home.alt
        } else {
            0.0
        };

        let status = &mut snapshot.status;
        status.gps_fix_good = gps.has_fix();
        status.longitude_good = gps.longitude_raw != 0;
        status.latitude_good = gps.latitude_raw != 0;
        status.altitude_good = gps.altitude_raw != 0;
        status.heading_good = true;

        debug!(
            "GPS: lat:{:.7} lon:{:.7} alt:{:.1}m sats:{} speed:{:.1}km/h",
            gps.latitude(),
            gps.longitude(),
            gps.altitude(),
            gps.satellites,
            gps.ground_speed()
        );
    }

    fn apply_battery(&mut self, battery: &BatterySensor) {
        self.snapshot.battery = BatteryState {
            voltage_dv: battery.voltage_dv,
            current_da: battery.current_da,
            volts: battery.voltage(),
            amps: battery.current(),
            capacity_used: battery.capacity_used,
            consumed_mah: battery.capacity_used_u16(),
            remaining_percent: battery.remaining_percent,
        };

        debug!(
            "BATTERY: volts:{:.1} amps:{:.1} Ah_drawn:{:.1} remaining:{}%",
            battery.voltage(),
            battery.current(),
            battery.capacity_used as f32 / 1000.0,
            battery.remaining_percent
        );
    }

    fn apply_attitude(&mut self, attitude: &Attitude) {
        let yaw = attitude.yaw_deg();

        self.snapshot.attitude = AttitudeState {
            pitch: attitude.pitch_deg(),
            roll: attitude.roll_deg(),
            yaw,
        };
        self.snapshot.position.current.heading = yaw;

        debug!(
            "ATTITUDE: pitch:{:.1}deg roll:{:.1}deg yaw:{:.1}deg",
            attitude.pitch_deg(),
            attitude.roll_deg(),
            yaw
        );
    }

    fn apply_flight_mode(&mut self, mode: &FlightMode, now: Instant) {
        let snapshot = &mut self.snapshot;
        snapshot.flight_mode = mode.label;
        snapshot.armed = mode.is_armed();

        let status = &mut snapshot.status;
        status.gps_good =
            status.gps_fix_good && status.longitude_good && status.latitude_good && status.altitude_good;
        if status.gps_good {
            let elapsed = now.saturating_duration_since(self.epoch);
            status.last_good_gps_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        }

        debug!(
            "FLIGHT_MODE: lth:{} {} armed:{} gps_good:{}",
            mode.label.len(),
            mode.label,
            snapshot.armed,
            status.gps_good
        );
    }
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new()
    }
}
