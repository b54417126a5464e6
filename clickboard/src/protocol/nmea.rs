// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! NMEA 0183 sentence lookup and field extraction.
//!
//! Works on whatever a GNSS receiver dumped into a response buffer: several sentences,
//! possibly cut off at either end. Sentences are located by their type (`GGA`, `RMC`, ...)
//! regardless of the talker id (`GP`, `GN`, `GL`, ...).

use super::ParseError;

/// Fields of a `GGA` (fix data) sentence, by comma index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum GgaElement {
    /// `hhmmss.sss` UTC.
    Time = 1,
    /// `ddmm.mmmm`.
    Latitude = 2,
    /// `N` or `S`.
    LatitudeSide = 3,
    /// `dddmm.mmmm`.
    Longitude = 4,
    /// `E` or `W`.
    LongitudeSide = 5,
    /// 0 = invalid, 1 = GPS, 2 = DGPS, ...
    FixQuality = 6,
    Satellites = 7,
    Hdop = 8,
    /// Antenna altitude above mean sea level.
    Altitude = 9,
    AltitudeUnit = 10,
    GeoidSeparation = 11,
    GeoidUnit = 12,
    DgpsAge = 13,
    DgpsStation = 14,
}

/// Locate the first complete-looking sentence of type `kind` (e.g. `b"GGA"`).
///
/// The returned slice starts at `$` and ends before the line terminator (or at the end of
/// `buf` if the sentence is cut off).
pub fn find_sentence<'a>(buf: &'a [u8], kind: &[u8]) -> Option<&'a [u8]> {
    let mut start = 0;
    while let Some(off) = buf[start..].iter().position(|&b| b == b'$') {
        let at = start + off;
        // `$` + 2-char talker id + type
        let tag = buf.get(at + 3..at + 3 + kind.len());
        if tag == Some(kind) {
            let rest = &buf[at..];
            let end = rest
                .iter()
                .position(|&b| b == b'\r' || b == b'\n')
                .unwrap_or(rest.len());
            return Some(&rest[..end]);
        }
        start = at + 1;
    }
    None
}

/// Comma-separated field `index` of `sentence` (0 is the `$xxTYP` tag). The trailing
/// `*hh` checksum is not part of the last field.
pub fn element(sentence: &[u8], index: usize) -> Result<&[u8], ParseError> {
    let body = match sentence.iter().position(|&b| b == b'*') {
        Some(star) => &sentence[..star],
        None => sentence,
    };
    body.split(|&b| b == b',')
        .nth(index)
        .ok_or(ParseError::MissingField)
}

/// Field of the first `GGA` sentence in `buf`.
pub fn gga_element(buf: &[u8], which: GgaElement) -> Result<&[u8], ParseError> {
    let sentence = find_sentence(buf, b"GGA").ok_or(ParseError::NotFound)?;
    element(sentence, which as usize)
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Verify the `*hh` XOR checksum of a sentence starting at `$`.
pub fn verify_checksum(sentence: &[u8]) -> Result<(), ParseError> {
    let body = sentence.strip_prefix(b"$").ok_or(ParseError::InvalidField)?;
    let star = body
        .iter()
        .position(|&b| b == b'*')
        .ok_or(ParseError::MissingField)?;

    let computed = body[..star].iter().fold(0u8, |acc, &b| acc ^ b);

    let hex = body
        .get(star + 1..star + 3)
        .ok_or(ParseError::MissingField)?;
    let hi = hex_nibble(hex[0]).ok_or(ParseError::InvalidField)?;
    let lo = hex_nibble(hex[1]).ok_or(ParseError::InvalidField)?;

    if computed == (hi << 4 | lo) {
        Ok(())
    } else {
        Err(ParseError::Checksum)
    }
}

/// Convert a `(d)ddmm.mmmm` field and its hemisphere (`N`/`S`/`E`/`W`) to signed decimal
/// degrees.
pub fn parse_coordinate(field: &[u8], side: &[u8]) -> Result<f32, ParseError> {
    let text = core::str::from_utf8(field).map_err(|_| ParseError::InvalidField)?;
    let dot = text.find('.').unwrap_or(text.len());
    if dot < 2 {
        return Err(ParseError::InvalidField);
    }

    let (deg, min) = text.split_at(dot - 2);
    let degrees: f32 = if deg.is_empty() {
        0.0
    } else {
        deg.parse::<u16>().map_err(|_| ParseError::InvalidField)? as f32
    };
    let minutes: f32 = min.parse().map_err(|_| ParseError::InvalidField)?;
    if minutes >= 60.0 {
        return Err(ParseError::InvalidField);
    }

    let value = degrees + minutes / 60.0;
    match side {
        b"N" | b"E" => Ok(value),
        b"S" | b"W" => Ok(-value),
        _ => Err(ParseError::InvalidField),
    }
}
