//! # CRSF Telemetry Bridge Library
//!
//! Decode CRSF telemetry relayed over an ESP-NOW backpack link into live
//! flight state.
//!
//! Datagrams arrive from a [`transport::DatagramSource`], are staged in a
//! [`ring_buffer::RingBuffer`], split into CRSF frames and decoded into a
//! [`telemetry::TelemetrySnapshot`] that display consumers read through
//! [`bridge::TelemetryBridge::subscribe`].

pub mod bridge;
pub mod config;
pub mod error;
pub mod crsf;
pub mod ring_buffer;
pub mod telemetry;
pub mod transport;
