//! # Telemetry Module
//!
//! Latest-value telemetry store fed by the CRSF decoders.
//!
//! This module handles:
//! - Holding one slot per telemetry field (attitude, battery, GPS, flight mode)
//! - Deriving GPS status flags and the last good GPS time
//! - Altitude above the latched home location

pub mod state;
pub mod types;

pub use state::TelemetryState;
pub use types::*;
