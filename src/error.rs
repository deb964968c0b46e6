//! # Error Types
//!
//! Custom error types for the CRSF telemetry bridge using `thiserror`.
//!
//! [`BridgeError`] covers failures of the application around the decode
//! pipeline (configuration, sockets). [`FrameError`] classifies why a single
//! datagram or frame was dropped. Frame errors are never fatal: the bridge logs
//! them, counts them and carries on with the next datagram.

use thiserror::Error;

/// Main error type for the telemetry bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Datagram transport errors
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for the telemetry bridge
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Reasons a datagram or frame is dropped without touching telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Packet too short to hold address, length, type and crc
    #[error("Packet too short: {len} bytes")]
    TransportTruncated { len: usize },

    /// Length field below the 2-byte minimum (type + crc)
    #[error("Invalid length field {length}")]
    InvalidLength { length: u8 },

    /// Payload shorter than the fixed layout of its frame type
    #[error("{frame_type} payload too short: {len} bytes, need {min}")]
    PayloadTooShort {
        frame_type: &'static str,
        len: usize,
        min: usize,
    },

    /// Frame type this bridge does not decode
    #[error("Unknown frame type 0x{0:02X}")]
    UnknownFrameType(u8),

    /// CRC byte missing or not matching (only with CRC verification enabled)
    #[error("CRC mismatch: expected 0x{expected:02X}, got {received:?}")]
    CrcMismatch { expected: u8, received: Option<u8> },
}
