//! # Datagram Transport Module
//!
//! Inbound side of the wireless link as seen by the bridge.
//!
//! This module handles:
//! - The [`DatagramSource`] seam the bridge reads from
//! - A UDP implementation for datagrams relayed by an ESP-NOW gateway
//! - Stripping the transport header that precedes the CRSF bytes

pub mod udp;

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;

pub use udp::UdpDatagramSource;

/// Default transport header length (MSP v2 framing added by the ELRS backpack)
pub const DEFAULT_HEADER_LEN: usize = 8;

/// One datagram as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// Sender of the datagram
    pub source: SocketAddr,
    /// Raw bytes, transport header included
    pub data: Bytes,
}

/// Producer of inbound datagrams
///
/// Implementations must only yield datagrams from the expected sender; the
/// bridge does no sender authentication of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatagramSource: Send {
    /// Wait for the next datagram
    ///
    /// `Ok(None)` means the source is closed and no more datagrams will come.
    async fn recv(&mut self) -> io::Result<Option<Datagram>>;
}

/// Return the bytes after a `header_len` transport header
///
/// Returns `None` when the datagram is not longer than its header.
///
/// # Examples
///
/// ```
/// use crsf_telemetry_bridge::transport::strip_transport_header;
///
/// let data = [0x24, 0x58, 0x3C, 0x00, 0x11, 0x00, 0x05, 0x00, 0xC8, 0x02, 0x21, 0x00];
/// assert_eq!(strip_transport_header(&data, 8), Some(&data[8..]));
/// assert_eq!(strip_transport_header(&data[..8], 8), None);
/// ```
pub fn strip_transport_header(data: &[u8], header_len: usize) -> Option<&[u8]> {
    match data.get(header_len..) {
        Some(rest) if !rest.is_empty() => Some(rest),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_header() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7, 0xC8, 0x02, 0x21, 0x00];
        assert_eq!(strip_transport_header(&data, DEFAULT_HEADER_LEN), Some(&[0xC8, 0x02, 0x21, 0x00][..]));
    }

    #[test]
    fn test_strip_header_zero_len() {
        let data = [0xC8, 0x02, 0x21, 0x00];
        assert_eq!(strip_transport_header(&data, 0), Some(&data[..]));
    }

    #[test]
    fn test_strip_header_short_datagram() {
        assert_eq!(strip_transport_header(&[1, 2, 3], DEFAULT_HEADER_LEN), None);
        assert_eq!(strip_transport_header(&[0u8; 8], DEFAULT_HEADER_LEN), None);
        assert_eq!(strip_transport_header(&[], 0), None);
    }
}
