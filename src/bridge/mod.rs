//! # Telemetry Bridge
//!
//! The ingestion path: packet in, frame extracted, payload decoded, telemetry
//! updated, snapshot published.
//!
//! [`TelemetryBridge`] is the only writer of the telemetry state. Readers get
//! whole [`TelemetrySnapshot`] copies through a `tokio::sync::watch` channel,
//! swapped in after each packet, so a reader never sees a half-applied frame.

pub mod runner;

use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::config::CrsfConfig;
use crate::crsf::crc::frame_crc;
use crate::crsf::decoder::decode_frame;
use crate::crsf::extractor::FrameExtractor;
use crate::crsf::protocol::FrameType;
use crate::error::FrameError;
use crate::telemetry::{TelemetrySnapshot, TelemetryState};

pub use runner::run;

/// Packet counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LinkStats {
    /// Packets handed to the bridge
    pub packets: u64,
    /// Frames decoded and applied
    pub decoded: u64,
    /// Packets dropped as truncated, invalid or too short
    pub dropped: u64,
    /// Frames of a type the bridge does not decode
    pub unknown: u64,
    /// Frames whose crc was missing or wrong
    pub crc_errors: u64,
}

/// CRSF telemetry ingestion pipeline
#[derive(Debug)]
pub struct TelemetryBridge {
    extractor: FrameExtractor,
    state: TelemetryState,
    verify_crc: bool,
    stats: LinkStats,
    publisher: watch::Sender<TelemetrySnapshot>,
}

impl TelemetryBridge {
    /// Create a bridge configured from the `[crsf]` section
    pub fn new(config: &CrsfConfig) -> Self {
        Self::with_state(config, TelemetryState::new())
    }

    /// Create a bridge around an existing state (e.g. with a fixed epoch)
    pub fn with_state(config: &CrsfConfig, state: TelemetryState) -> Self {
        let (publisher, _) = watch::channel(*state.snapshot());
        Self {
            extractor: FrameExtractor::new(config.ring_capacity),
            state,
            verify_crc: config.verify_crc,
            stats: LinkStats::default(),
            publisher,
        }
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<TelemetrySnapshot> {
        self.publisher.subscribe()
    }

    /// Latest telemetry
    pub fn snapshot(&self) -> &TelemetrySnapshot {
        self.state.snapshot()
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Handle one packet received now
    ///
    /// See [`handle_packet_at`](Self::handle_packet_at).
    pub fn handle_packet(&mut self, packet: &[u8]) -> Result<FrameType, FrameError> {
        self.handle_packet_at(packet, Instant::now())
    }

    /// Handle one packet received at `now`
    ///
    /// Decodes at most one frame. Errors only describe why the packet was
    /// dropped; telemetry is left untouched in that case and the bridge stays
    /// ready for the next packet.
    pub fn handle_packet_at(&mut self, packet: &[u8], now: Instant) -> Result<FrameType, FrameError> {
        self.stats.packets += 1;

        match self.process(packet, now) {
            Ok(frame_type) => {
                self.stats.decoded += 1;
                self.publisher.send_replace(*self.state.snapshot());
                Ok(frame_type)
            }
            Err(err) => {
                match err {
                    FrameError::UnknownFrameType(code) => {
                        self.stats.unknown += 1;
                        trace!("Ignoring frame type 0x{:02X}", code);
                    }
                    FrameError::CrcMismatch { .. } => {
                        self.stats.crc_errors += 1;
                        debug!("Dropped packet: {}", err);
                    }
                    _ => {
                        self.stats.dropped += 1;
                        debug!("Dropped packet: {}", err);
                    }
                }
                Err(err)
            }
        }
    }

    /// Latch the current location as home (one-shot)
    ///
    /// Returns `false` if home was already stored.
    pub fn store_home(&mut self) -> bool {
        let stored = self.state.store_home();
        if stored {
            self.publisher.send_replace(*self.state.snapshot());
        }
        stored
    }

    fn process(&mut self, packet: &[u8], now: Instant) -> Result<FrameType, FrameError> {
        let frame = self.extractor.push_packet(packet)?;

        trace!(
            "Frame addr:0x{:02X} len:{} type:0x{:02X} payload:{}",
            frame.address,
            frame.length,
            frame.frame_type,
            frame.payload.len()
        );
        if frame.is_truncated() {
            debug!(
                "Frame type 0x{:02X} declares {} payload bytes, captured {}",
                frame.frame_type,
                frame.declared_payload_len(),
                frame.payload.len()
            );
        }

        let expected = frame_crc(frame.frame_type, frame.payload);
        if frame.crc != Some(expected) {
            if self.verify_crc {
                return Err(FrameError::CrcMismatch {
                    expected,
                    received: frame.crc,
                });
            }
            trace!("CRC 0x{:02X} expected, got {:?}", expected, frame.crc);
        }

        let update = decode_frame(&frame)?;
        self.state.apply(&update, now);
        Ok(update.frame_type())
    }
}
