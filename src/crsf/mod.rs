//! # CRSF Protocol Module
//!
//! Receive side of the Crossfire (CRSF) protocol as relayed by an ELRS backpack.
//!
//! This module handles:
//! - Frame extraction from staged packets, with length clamping
//! - Telemetry payload decoding (GPS, Battery, Attitude, Flight Mode)
//! - CRC8-DVB-S2 checksum calculation

pub mod protocol;
pub mod extractor;
pub mod decoder;
pub mod crc;
