//! # CRSF Frame Extractor
//!
//! Stages each inbound packet in the [`RingBuffer`] and pulls exactly one
//! frame back out per packet event.
//!
//! The extractor never reads past the bytes that were actually captured. A
//! frame whose length field promises more bytes than arrived is clamped to
//! what is there, and its crc is reported as missing.

use tracing::{debug, trace};

use super::protocol::*;
use crate::error::FrameError;
use crate::ring_buffer::RingBuffer;

/// Parse one frame out of a captured byte span
///
/// # Errors
///
/// - `TransportTruncated` if `bytes` is shorter than 4 bytes
/// - `InvalidLength` if the length field is below 2
///
/// # Examples
///
/// ```
/// use crsf_telemetry_bridge::crsf::extractor::parse_frame;
///
/// let bytes = [0xC8, 0x05, 0x21, b'A', b'R', b'M', 0x4A];
/// let frame = parse_frame(&bytes).unwrap();
/// assert_eq!(frame.payload, b"ARM");
/// assert_eq!(frame.crc, Some(0x4A));
/// ```
pub fn parse_frame(bytes: &[u8]) -> Result<RawFrame<'_>, FrameError> {
    if bytes.len() < CRSF_MIN_PACKET_LEN {
        return Err(FrameError::TransportTruncated { len: bytes.len() });
    }

    let length = bytes[1];
    if length < CRSF_MIN_LENGTH_FIELD {
        return Err(FrameError::InvalidLength { length });
    }

    let declared = usize::from(length - CRSF_MIN_LENGTH_FIELD);
    let captured = bytes.len() - 3;
    let payload_len = declared.min(captured);

    Ok(RawFrame {
        address: bytes[0],
        length,
        frame_type: bytes[2],
        payload: &bytes[3..3 + payload_len],
        crc: bytes.get(3 + declared).copied(),
    })
}

/// Ring-buffered frame extractor
#[derive(Debug)]
pub struct FrameExtractor {
    ring: RingBuffer,
    /// Bytes of the frame currently being decoded
    scratch: [u8; CRSF_MAX_STAGED_PACKET_LEN],
}

impl FrameExtractor {
    /// Create an extractor staging packets in a ring of `ring_capacity` bytes
    ///
    /// The ring is never smaller than one staged packet.
    pub fn new(ring_capacity: usize) -> Self {
        Self {
            ring: RingBuffer::new(ring_capacity.max(CRSF_MAX_STAGED_PACKET_LEN)),
            scratch: [0; CRSF_MAX_STAGED_PACKET_LEN],
        }
    }

    /// Push a packet into the ring
    ///
    /// Packets longer than [`CRSF_MAX_STAGED_PACKET_LEN`] are clamped. Any bytes
    /// still in the ring ahead of this packet are stale and get dropped.
    ///
    /// # Returns
    ///
    /// Number of bytes staged for the next [`extract`](Self::extract).
    pub fn stage(&mut self, packet: &[u8]) -> Result<usize, FrameError> {
        if packet.len() < CRSF_MIN_PACKET_LEN {
            return Err(FrameError::TransportTruncated { len: packet.len() });
        }

        let staged = packet.len().min(CRSF_MAX_STAGED_PACKET_LEN);
        if staged < packet.len() {
            debug!("Clamped {} byte packet to {} bytes", packet.len(), staged);
        }

        self.ring.push(&packet[..staged]);

        let stale = self.ring.available() - staged;
        if stale > 0 {
            trace!("Dropping {} stale bytes from ring", stale);
            self.ring.discard(stale);
        }

        Ok(staged)
    }

    /// Pull one frame spanning the next `captured` bytes of the ring
    ///
    /// The captured bytes are consumed whether or not they form a valid frame.
    pub fn extract(&mut self, captured: usize) -> Result<RawFrame<'_>, FrameError> {
        let n = captured
            .min(self.ring.available())
            .min(CRSF_MAX_STAGED_PACKET_LEN);

        for slot in self.scratch[..n].iter_mut() {
            // n never exceeds available(), so read() always yields a byte here
            *slot = self.ring.read().unwrap_or_default();
        }

        parse_frame(&self.scratch[..n])
    }

    /// Stage a packet and extract its frame in one step
    pub fn push_packet(&mut self, packet: &[u8]) -> Result<RawFrame<'_>, FrameError> {
        let staged = self.stage(packet)?;
        self.extract(staged)
    }

    /// Bytes still waiting in the ring
    pub fn buffered(&self) -> usize {
        self.ring.available()
    }

    pub fn ring_capacity(&self) -> usize {
        self.ring.capacity()
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new(crate::ring_buffer::DEFAULT_RING_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_frame() {
        let bytes = [0xC8, 0x08, 0x1E, 0x03, 0xE8, 0xFE, 0x0C, 0x07, 0xD0, 0x99];
        let frame = parse_frame(&bytes).unwrap();

        assert_eq!(frame.address, 0xC8);
        assert_eq!(frame.length, 8);
        assert_eq!(frame.frame_type, 0x1E);
        assert_eq!(frame.payload, &[0x03, 0xE8, 0xFE, 0x0C, 0x07, 0xD0]);
        assert_eq!(frame.crc, Some(0x99));
        assert!(!frame.is_truncated());
    }

    #[test]
    fn test_parse_too_short() {
        assert_eq!(
            parse_frame(&[0xC8, 0x02, 0x21]),
            Err(FrameError::TransportTruncated { len: 3 })
        );
    }

    #[test]
    fn test_parse_invalid_length() {
        assert_eq!(
            parse_frame(&[0xC8, 0x01, 0x21, 0x00]),
            Err(FrameError::InvalidLength { length: 1 })
        );
        assert_eq!(
            parse_frame(&[0xC8, 0x00, 0x21, 0x00]),
            Err(FrameError::InvalidLength { length: 0 })
        );
    }

    #[test]
    fn test_parse_empty_payload() {
        let frame = parse_frame(&[0xC8, 0x02, 0x21, 0x7F]).unwrap();
        assert!(frame.payload.is_empty());
        assert_eq!(frame.crc, Some(0x7F));
    }

    #[test]
    fn test_parse_declared_length_exceeds_capture() {
        // Declares 8 payload bytes, only 3 arrived
        let bytes = [0xC8, 0x0A, 0x08, 0x00, 0x64, 0x00];
        let frame = parse_frame(&bytes).unwrap();

        assert_eq!(frame.payload, &[0x00, 0x64, 0x00]);
        assert_eq!(frame.crc, None);
        assert!(frame.is_truncated());
    }

    #[test]
    fn test_parse_missing_only_crc() {
        let bytes = [0xC8, 0x05, 0x21, b'A', b'R', b'M'];
        let frame = parse_frame(&bytes).unwrap();
        assert_eq!(frame.payload, b"ARM");
        assert_eq!(frame.crc, None);
        assert!(!frame.is_truncated());
    }

    #[test]
    fn test_parse_ignores_trailing_bytes() {
        let bytes = [0xC8, 0x03, 0x21, b'X', 0x11, 0xEE, 0xEE];
        let frame = parse_frame(&bytes).unwrap();
        assert_eq!(frame.payload, b"X");
        assert_eq!(frame.crc, Some(0x11));
    }

    #[test]
    fn test_push_packet_drains_ring() {
        let mut extractor = FrameExtractor::default();
        let frame = extractor.push_packet(&[0xC8, 0x04, 0x21, b'O', b'K', 0x00]).unwrap();
        assert_eq!(frame.payload, b"OK");
        assert_eq!(extractor.buffered(), 0);
    }

    #[test]
    fn test_push_packet_rejects_short() {
        let mut extractor = FrameExtractor::default();
        assert_eq!(
            extractor.push_packet(&[0xC8, 0x02]),
            Err(FrameError::TransportTruncated { len: 2 })
        );
        assert_eq!(extractor.buffered(), 0);
    }

    #[test]
    fn test_invalid_frame_is_still_consumed() {
        let mut extractor = FrameExtractor::default();
        assert!(extractor.push_packet(&[0xC8, 0x01, 0x21, 0x00]).is_err());
        assert_eq!(extractor.buffered(), 0);

        // Next packet decodes cleanly, nothing left over from the bad one
        let frame = extractor.push_packet(&[0xEE, 0x03, 0x21, b'Z', 0x00]).unwrap();
        assert_eq!(frame.address, 0xEE);
        assert_eq!(frame.payload, b"Z");
    }

    #[test]
    fn test_stage_drops_stale_backlog() {
        let mut extractor = FrameExtractor::default();
        extractor.stage(&[0xAA, 0xBB, 0xCC, 0xDD, 0xEE]).unwrap();
        assert_eq!(extractor.buffered(), 5);

        let staged = extractor.stage(&[0xC8, 0x03, 0x21, b'Q', 0x00]).unwrap();
        assert_eq!(extractor.buffered(), staged);

        let frame = extractor.extract(staged).unwrap();
        assert_eq!(frame.payload, b"Q");
    }

    #[test]
    fn test_oversized_packet_is_clamped() {
        let mut packet = vec![0xC8, 0xFF, 0x21];
        packet.extend(std::iter::repeat(b'M').take(200));

        let mut extractor = FrameExtractor::default();
        let frame = extractor.push_packet(&packet).unwrap();
        assert_eq!(frame.payload.len(), CRSF_MAX_STAGED_PACKET_LEN - 3);
        assert_eq!(frame.crc, None);
        assert_eq!(extractor.buffered(), 0);
    }

    #[test]
    fn test_ring_capacity_floor() {
        let extractor = FrameExtractor::new(16);
        assert_eq!(extractor.ring_capacity(), CRSF_MAX_STAGED_PACKET_LEN);
    }
}
