//! # CRC8-DVB-S2 Implementation
//!
//! CRC-8-DVB-S2 checksum used by CRSF frames.
//!
//! **Polynomial**: 0xD5 (x^8 + x^7 + x^6 + x^4 + x^2 + 1)
//! **Initial Value**: 0x00
//! **Coverage**: type byte + payload

/// CRC-8-DVB-S2 polynomial
const CRC8_POLY: u8 = 0xD5;

/// Precomputed lookup table
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;

        while bit < 8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ CRC8_POLY } else { crc << 1 };
            bit += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Fold one byte into a running checksum
#[inline]
pub fn crc8_update(crc: u8, byte: u8) -> u8 {
    CRC8_TABLE[usize::from(crc ^ byte)]
}

/// Calculate CRC8-DVB-S2 over a byte slice
///
/// # Examples
///
/// ```
/// use crsf_telemetry_bridge::crsf::crc::crc8_dvb_s2;
///
/// assert_eq!(crc8_dvb_s2(b"123456789"), 0xBC);
/// ```
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    data.iter().fold(0, |crc, &byte| crc8_update(crc, byte))
}

/// Checksum of a frame: type byte followed by the payload
pub fn frame_crc(frame_type: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(crc8_update(0, frame_type), |crc, &byte| crc8_update(crc, byte))
}
