// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-level protocols spoken by UART Clicks.
//!
//! - [`crc16`] – table-driven CRC16 (MODBUS parameters)
//! - [`frame`] – `SYNC SYNC LEN PAYLOAD CRC` packet framing used by the FT Click
//! - [`at`] – AT command writer and polled response accumulator
//! - [`nmea`] – NMEA 0183 sentence lookup and field extraction
//! - [`xsens`] – Xsens Xbus message parser and MTData2 decoding

use core::fmt;

pub mod at;
pub mod crc16;
pub mod frame;
pub mod nmea;
pub mod xsens;

pub use frame::FrameParser;

/// Decoding failure in one of the protocol parsers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The output buffer or the frame length field cannot hold the data.
    Overflow,
    /// Checksum mismatch.
    Checksum,
    /// The requested sentence or data item is not in the buffer.
    NotFound,
    /// The sentence ends before the requested field.
    MissingField,
    /// The field is present but not in the expected format.
    InvalidField,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParseError::Overflow => "buffer overflow",
            ParseError::Checksum => "checksum mismatch",
            ParseError::NotFound => "not found",
            ParseError::MissingField => "missing field",
            ParseError::InvalidField => "invalid field",
        })
    }
}
