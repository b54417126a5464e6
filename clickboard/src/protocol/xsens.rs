// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Xsens Xbus messages (MTi 1-series over UART).
//!
//! ```text
//! PRE(0xFA) BID(0xFF) MID LEN [LEN_HI LEN_LO] DATA... CS
//! ```
//!
//! `LEN = 0xFF` announces a 16-bit big-endian extended length. The checksum makes the sum of
//! every byte after the preamble equal zero (mod 256).
//!
//! Measurement output comes as `MTData2` messages: a sequence of data items, each a 16-bit
//! data identifier (XDI), a one-byte size and that many bytes of big-endian data.

#[allow(unused_imports)]
use micromath::F32Ext;

use log::warn;

use super::ParseError;

pub const PREAMBLE: u8 = 0xFA;
pub const BUS_ID: u8 = 0xFF;
const EXTENDED_LEN: u8 = 0xFF;

/// Message identifiers.
pub mod mid {
    pub const REQ_DID: u8 = 0x00;
    pub const DEVICE_ID: u8 = 0x01;
    pub const GOTO_MEASUREMENT: u8 = 0x10;
    pub const GOTO_CONFIG: u8 = 0x30;
    pub const MT_DATA2: u8 = 0x36;
    pub const WAKE_UP: u8 = 0x3E;
    pub const WAKE_UP_ACK: u8 = 0x3F;
    pub const ERROR: u8 = 0x42;
    pub const RESET: u8 = 0x40;
}

/// Data identifiers inside `MTData2`. The low nibble carries format bits and is masked off.
pub mod xdi {
    pub const PACKET_COUNTER: u16 = 0x1020;
    pub const SAMPLE_TIME_FINE: u16 = 0x1060;
    pub const QUATERNION: u16 = 0x2010;
    pub const EULER_ANGLES: u16 = 0x2030;
    pub const TYPE_MASK: u16 = 0xFFF0;
    /// Format bits selecting a non-`f32` precision.
    pub const PRECISION_MASK: u16 = 0x0003;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    WaitPreamble,
    WaitBid,
    WaitMid,
    WaitLen,
    WaitExtLenHi,
    WaitExtLenLo,
    Data,
    WaitChecksum,
}

/// Byte-at-a-time Xbus receiver with an `N`-byte data buffer.
pub struct XbusParser<const N: usize> {
    state: State,
    mid: u8,
    len: usize,
    count: usize,
    sum: u8,
    ready: bool,
    buf: [u8; N],
}

impl<const N: usize> XbusParser<N> {
    pub const fn new() -> Self {
        Self {
            state: State::WaitPreamble,
            mid: 0,
            len: 0,
            count: 0,
            sum: 0,
            ready: false,
            buf: [0; N],
        }
    }

    fn after_length(&mut self) {
        if self.len > N {
            warn!("xbus message of {} bytes exceeds buffer of {}", self.len, N);
            self.state = State::WaitPreamble;
        } else if self.len == 0 {
            self.state = State::WaitChecksum;
        } else {
            self.state = State::Data;
        }
    }

    /// Process a single incoming byte. Returns the message id once a message with a valid
    /// checksum has been received; its data is then available from [`XbusParser::data`]
    /// until the next preamble arrives.
    pub fn push(&mut self, byte: u8) -> Option<u8> {
        match self.state {
            State::WaitPreamble => {
                if byte == PREAMBLE {
                    self.ready = false;
                    self.sum = 0;
                    self.count = 0;
                    self.state = State::WaitBid;
                }
            }
            State::WaitBid => {
                self.sum = self.sum.wrapping_add(byte);
                self.state = if byte == BUS_ID {
                    State::WaitMid
                } else {
                    State::WaitPreamble
                };
            }
            State::WaitMid => {
                self.sum = self.sum.wrapping_add(byte);
                self.mid = byte;
                self.state = State::WaitLen;
            }
            State::WaitLen => {
                self.sum = self.sum.wrapping_add(byte);
                if byte == EXTENDED_LEN {
                    self.state = State::WaitExtLenHi;
                } else {
                    self.len = byte as usize;
                    self.after_length();
                }
            }
            State::WaitExtLenHi => {
                self.sum = self.sum.wrapping_add(byte);
                self.len = (byte as usize) << 8;
                self.state = State::WaitExtLenLo;
            }
            State::WaitExtLenLo => {
                self.sum = self.sum.wrapping_add(byte);
                self.len |= byte as usize;
                self.after_length();
            }
            State::Data => {
                self.sum = self.sum.wrapping_add(byte);
                self.buf[self.count] = byte;
                self.count += 1;
                if self.count == self.len {
                    self.state = State::WaitChecksum;
                }
            }
            State::WaitChecksum => {
                self.state = State::WaitPreamble;
                if self.sum.wrapping_add(byte) == 0 {
                    self.ready = true;
                    return Some(self.mid);
                }
                warn!("xbus checksum mismatch on mid 0x{:02X}", self.mid);
            }
        }
        None
    }

    /// Id of the last valid message, if one is available.
    pub fn mid(&self) -> Option<u8> {
        self.ready.then_some(self.mid)
    }

    /// Data of the last valid message.
    pub fn data(&self) -> Option<&[u8]> {
        self.ready.then(|| &self.buf[..self.len])
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl<const N: usize> Default for XbusParser<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a complete Xbus message into `out`. Returns its length.
pub fn encode_message(mid: u8, data: &[u8], out: &mut [u8]) -> Result<usize, ParseError> {
    let extended = data.len() >= EXTENDED_LEN as usize;
    let header = if extended { 6 } else { 4 };
    let total = header + data.len() + 1;
    if data.len() > u16::MAX as usize || total > out.len() {
        return Err(ParseError::Overflow);
    }

    out[0] = PREAMBLE;
    out[1] = BUS_ID;
    out[2] = mid;
    if extended {
        out[3] = EXTENDED_LEN;
        out[4..6].copy_from_slice(&(data.len() as u16).to_be_bytes());
    } else {
        out[3] = data.len() as u8;
    }
    out[header..header + data.len()].copy_from_slice(data);

    let sum = out[1..header + data.len()]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    out[total - 1] = sum.wrapping_neg();
    Ok(total)
}

/// Payload of the first `MTData2` item whose identifier matches `id` (format bits ignored).
pub fn find_item(data: &[u8], id: u16) -> Result<(u16, &[u8]), ParseError> {
    let mut rest = data;
    while !rest.is_empty() {
        if rest.len() < 3 {
            return Err(ParseError::InvalidField);
        }
        let ident = u16::from_be_bytes([rest[0], rest[1]]);
        let size = rest[2] as usize;
        let item = rest.get(3..3 + size).ok_or(ParseError::InvalidField)?;
        if ident & xdi::TYPE_MASK == id & xdi::TYPE_MASK {
            return Ok((ident, item));
        }
        rest = &rest[3 + size..];
    }
    Err(ParseError::NotFound)
}

fn be_f32s<const K: usize>(xdi_id: u16, item: &[u8]) -> Result<[f32; K], ParseError> {
    if xdi_id & xdi::PRECISION_MASK != 0 || item.len() != 4 * K {
        return Err(ParseError::InvalidField);
    }
    let mut out = [0.0f32; K];
    for (v, chunk) in out.iter_mut().zip(item.chunks_exact(4)) {
        *v = f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(out)
}

/// Orientation as a unit quaternion.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Orientation as roll/pitch/yaw in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Euler {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Quaternion {
    /// Decode the quaternion item of an `MTData2` payload.
    pub fn from_mtdata2(data: &[u8]) -> Result<Self, ParseError> {
        let (id, item) = find_item(data, xdi::QUATERNION)?;
        let [w, x, y, z] = be_f32s::<4>(id, item)?;
        Ok(Self { w, x, y, z })
    }

    /// Aerospace sequence (Z-Y-X) Euler angles.
    pub fn to_euler(&self) -> Euler {
        let Self { w, x, y, z } = *self;

        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        let pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        Euler {
            roll: roll.to_degrees(),
            pitch: pitch.to_degrees(),
            yaw: yaw.to_degrees(),
        }
    }
}

impl Euler {
    /// Decode the Euler angles item of an `MTData2` payload.
    pub fn from_mtdata2(data: &[u8]) -> Result<Self, ParseError> {
        let (id, item) = find_item(data, xdi::EULER_ANGLES)?;
        let [roll, pitch, yaw] = be_f32s::<3>(id, item)?;
        Ok(Self { roll, pitch, yaw })
    }
}

/// Packet counter item of an `MTData2` payload.
pub fn packet_counter(data: &[u8]) -> Result<u16, ParseError> {
    let (_, item) = find_item(data, xdi::PACKET_COUNTER)?;
    match item {
        [hi, lo] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(ParseError::InvalidField),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mtdata2(counter: u16, q: [f32; 4]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&xdi::PACKET_COUNTER.to_be_bytes());
        data.push(2);
        data.extend_from_slice(&counter.to_be_bytes());
        data.extend_from_slice(&xdi::QUATERNION.to_be_bytes());
        data.push(16);
        for v in q {
            data.extend_from_slice(&v.to_be_bytes());
        }
        data
    }

    fn quat(w: f32, x: f32, y: f32, z: f32) -> Quaternion {
        Quaternion { w, x, y, z }
    }

    #[test]
    fn encodes_known_messages() {
        let mut out = [0u8; 8];
        assert_eq!(encode_message(mid::GOTO_CONFIG, &[], &mut out), Ok(5));
        assert_eq!(&out[..5], &[0xFA, 0xFF, 0x30, 0x00, 0xD1]);

        assert_eq!(encode_message(mid::WAKE_UP_ACK, &[], &mut out), Ok(5));
        assert_eq!(&out[..5], &[0xFA, 0xFF, 0x3F, 0x00, 0xC2]);
    }

    #[test]
    fn parses_mtdata2_after_noise() {
        let data = mtdata2(7, [1.0, 0.0, 0.0, 0.0]);
        let mut msg = [0u8; 64];
        let n = encode_message(mid::MT_DATA2, &data, &mut msg).unwrap();

        let mut p = XbusParser::<64>::new();
        for b in [0x00, 0x12, 0xFA, 0x01] {
            assert_eq!(p.push(b), None);
        }
        let mut got = None;
        for &b in &msg[..n] {
            if let Some(m) = p.push(b) {
                got = Some(m);
            }
        }
        assert_eq!(got, Some(mid::MT_DATA2));

        let payload = p.data().unwrap();
        assert_eq!(packet_counter(payload), Ok(7));
        let q = Quaternion::from_mtdata2(payload).unwrap();
        assert_eq!(q, quat(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn bad_checksum_is_dropped() {
        let mut msg = [0u8; 8];
        let n = encode_message(mid::DEVICE_ID, &[1, 2, 3], &mut msg).unwrap();
        msg[n - 1] ^= 1;

        let mut p = XbusParser::<16>::new();
        assert!(msg[..n].iter().all(|&b| p.push(b).is_none()));
        assert!(p.data().is_none());
    }

    #[test]
    fn extended_length_round_trip() {
        let data = [0x5Au8; 300];
        let mut msg = [0u8; 320];
        let n = encode_message(mid::MT_DATA2, &data, &mut msg).unwrap();
        assert_eq!(n, 307);
        assert_eq!(&msg[3..6], &[0xFF, 0x01, 0x2C]);

        let mut p = XbusParser::<300>::new();
        let got = msg[..n].iter().filter_map(|&b| p.push(b)).last();
        assert_eq!(got, Some(mid::MT_DATA2));
        assert_eq!(p.data().map(|d| d.len()), Some(300));
    }

    #[test]
    fn oversize_message_is_skipped() {
        let mut msg = [0u8; 32];
        let n = encode_message(mid::MT_DATA2, &[0u8; 20], &mut msg).unwrap();

        let mut p = XbusParser::<8>::new();
        assert!(msg[..n].iter().all(|&b| p.push(b).is_none()));

        let n = encode_message(mid::WAKE_UP, &[], &mut msg).unwrap();
        let got = msg[..n].iter().filter_map(|&b| p.push(b)).last();
        assert_eq!(got, Some(mid::WAKE_UP));
    }

    #[test]
    fn missing_and_malformed_items() {
        let data = mtdata2(1, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(Euler::from_mtdata2(&data), Err(ParseError::NotFound));
        let truncated = find_item(&data[..7], xdi::QUATERNION);
        assert_eq!(truncated, Err(ParseError::InvalidField));
    }

    #[test]
    fn quaternion_to_euler() {
        let e = quat(1.0, 0.0, 0.0, 0.0).to_euler();
        assert_eq!(e, Euler::default());

        // 90 degrees about Z
        let h = core::f32::consts::FRAC_1_SQRT_2;
        let e = quat(h, 0.0, 0.0, h).to_euler();
        assert!(e.roll.abs() < 1e-3);
        assert!(e.pitch.abs() < 1e-3);
        assert!((e.yaw - 90.0).abs() < 1e-3);

        // 90 degrees about X
        let e = quat(h, h, 0.0, 0.0).to_euler();
        assert!((e.roll - 90.0).abs() < 1e-3);
    }
}
