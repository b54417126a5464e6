// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Framed packet protocol used by the FT Click.
//!
//! ```text
//! +------+------+--------+--------+-------------+--------+--------+
//! | 0x55 | 0x55 | LEN lo | LEN hi | payload ... | CRC lo | CRC hi |
//! +------+------+--------+--------+-------------+--------+--------+
//! ```
//!
//! `LEN` is the length of the whole frame (header, payload and CRC). The CRC16 covers the
//! header and the payload.
//!
//! [`FrameParser`] accumulates one frame at a time. Once a frame is complete it holds it until
//! the consumer drains it with [`FrameParser::take`]; bytes pushed in the meantime are dropped.
//! The receive path does not check the CRC before flagging new data, call
//! [`FrameParser::crc_valid`] to do so.

use log::{trace, warn};

use super::crc16::{crc16, Crc16};
use super::ParseError;

/// Header sync byte (sent twice).
pub const SYNC: u8 = 0x55;

/// Sync bytes plus the 16-bit length field.
pub const HEADER_LEN: usize = 4;

pub const CRC_LEN: usize = 2;

/// Frame bytes that are not payload.
pub const OVERHEAD: usize = HEADER_LEN + CRC_LEN;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    WaitHeader1,
    WaitHeader2,
    WaitLenLsb,
    WaitLenMsb,
    Payload,
    Complete,
}

/// Receive-side frame accumulator with an `N`-byte buffer.
pub struct FrameParser<const N: usize> {
    state: State,
    buf: [u8; N],
    count: usize,
    declared: usize,
    // Consecutive non-sync bytes seen after the first sync byte.
    misses: u8,
}

impl<const N: usize> FrameParser<N> {
    const CAPACITY_OK: () = assert!(N >= HEADER_LEN, "frame buffer smaller than the header");

    pub const fn new() -> Self {
        let () = Self::CAPACITY_OK;
        Self {
            state: State::WaitHeader1,
            buf: [0; N],
            count: 0,
            declared: 0,
            misses: 0,
        }
    }

    #[inline]
    fn store(&mut self, byte: u8) {
        self.buf[self.count] = byte;
        self.count += 1;
    }

    #[inline]
    fn complete(&mut self) -> bool {
        self.state = State::Complete;
        trace!("frame complete: {} bytes", self.count);
        true
    }

    /// Process a single incoming byte. Returns `true` when this byte completed a frame.
    ///
    /// Safe to call from a UART receive interrupt: it never blocks and never allocates.
    pub fn push(&mut self, byte: u8) -> bool {
        match self.state {
            State::Complete => {
                trace!("frame pending, dropped 0x{:02X}", byte);
            }
            State::WaitHeader1 => {
                if byte == SYNC {
                    self.store(byte);
                    self.misses = 0;
                    self.state = State::WaitHeader2;
                }
            }
            State::WaitHeader2 => {
                if byte == SYNC {
                    self.store(byte);
                    self.misses = 0;
                    self.state = State::WaitLenLsb;
                } else {
                    // One stray byte between the sync bytes is skipped, a second one restarts
                    // the search.
                    self.misses += 1;
                    if self.misses >= 2 {
                        self.reset();
                    }
                }
            }
            State::WaitLenLsb => {
                self.store(byte);
                self.declared = byte as usize;
                self.state = State::WaitLenMsb;
            }
            State::WaitLenMsb => {
                self.store(byte);
                self.declared |= (byte as usize) << 8;

                if self.declared > N {
                    warn!(
                        "frame length {} exceeds buffer of {}, resyncing",
                        self.declared, N
                    );
                    self.reset();
                } else if self.count >= self.declared {
                    return self.complete();
                } else {
                    self.state = State::Payload;
                }
            }
            State::Payload => {
                self.store(byte);
                if self.count >= self.declared {
                    return self.complete();
                }
            }
        }
        false
    }

    /// Feed a slice of bytes. Returns `true` if a frame is pending afterwards.
    pub fn push_slice(&mut self, bytes: &[u8]) -> bool {
        for &b in bytes {
            self.push(b);
        }
        self.new_data()
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// A complete frame is waiting to be drained.
    #[inline]
    pub fn new_data(&self) -> bool {
        self.state == State::Complete
    }

    /// Bytes accumulated for the current frame, header included.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.count
    }

    /// Value of the length field of the current frame (0 until it has been received).
    #[inline]
    pub fn declared_len(&self) -> usize {
        self.declared
    }

    /// The pending frame as received, header and CRC included.
    pub fn frame(&self) -> Option<&[u8]> {
        self.new_data().then(|| &self.buf[..self.count])
    }

    /// Payload length of the pending frame.
    #[inline]
    fn payload_len(&self) -> usize {
        self.declared.saturating_sub(OVERHEAD)
    }

    /// Payload of the pending frame, without header and CRC.
    pub fn payload(&self) -> Option<&[u8]> {
        self.new_data()
            .then(|| &self.buf[HEADER_LEN..HEADER_LEN + self.payload_len()])
    }

    /// Check the trailing CRC of the pending frame against header + payload.
    ///
    /// `None` if no frame is pending or it is too short to carry a CRC.
    pub fn crc_valid(&self) -> Option<bool> {
        if !self.new_data() || self.declared < OVERHEAD {
            return None;
        }
        let body = HEADER_LEN + self.payload_len();
        let received = u16::from_le_bytes([self.buf[body], self.buf[body + 1]]);
        Some(crc16(&self.buf[..body]) == received)
    }

    /// Copy the pending payload into `out` and rearm the parser.
    ///
    /// Returns the number of bytes copied (the payload is truncated to `out.len()`). Does
    /// nothing and returns 0 while no frame is complete.
    pub fn take(&mut self, out: &mut [u8]) -> usize {
        let n = match self.payload() {
            Some(payload) => {
                let n = payload.len().min(out.len());
                out[..n].copy_from_slice(&payload[..n]);
                n
            }
            None => return 0,
        };
        self.reset();
        n
    }

    /// Drop any partial or pending frame and search for a new header.
    pub fn reset(&mut self) {
        self.state = State::WaitHeader1;
        self.count = 0;
        self.declared = 0;
        self.misses = 0;
    }
}

impl<const N: usize> Default for FrameParser<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a frame around `payload` into `out`. Returns the frame length.
pub fn encode_frame(payload: &[u8], out: &mut [u8]) -> Result<usize, ParseError> {
    let total = payload.len() + OVERHEAD;
    if total > u16::MAX as usize || total > out.len() {
        return Err(ParseError::Overflow);
    }

    let len = (total as u16).to_le_bytes();
    out[0] = SYNC;
    out[1] = SYNC;
    out[2] = len[0];
    out[3] = len[1];

    let body = HEADER_LEN + payload.len();
    out[HEADER_LEN..body].copy_from_slice(payload);

    let crc = Crc16::new().update(&out[..body]).finish();
    out[body..total].copy_from_slice(&crc.to_le_bytes());

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    type Parser = FrameParser<64>;

    fn frame_of(payload: &[u8]) -> ([u8; 64], usize) {
        let mut out = [0u8; 64];
        let n = encode_frame(payload, &mut out).unwrap();
        (out, n)
    }

    #[test]
    fn encode_layout() {
        let (frame, n) = frame_of(&[0x01, 0x02, 0x03]);
        assert_eq!(n, 9);
        assert_eq!(&frame[..7], &[SYNC, SYNC, 9, 0, 0x01, 0x02, 0x03]);
        let crc = crc16(&frame[..7]).to_le_bytes();
        assert_eq!(&frame[7..9], &crc);
    }

    #[test]
    fn encode_rejects_small_output() {
        let mut out = [0u8; 8];
        let r = encode_frame(&[1, 2, 3], &mut out);
        assert_eq!(r, Err(ParseError::Overflow));
    }

    #[test]
    fn completes_after_exactly_declared_bytes() {
        let (frame, n) = frame_of(b"hello");
        let mut p = Parser::new();

        for (i, &b) in frame[..n].iter().enumerate() {
            let done = p.push(b);
            assert_eq!(done, i == n - 1, "byte {}", i);
            assert_eq!(p.new_data(), i == n - 1);
        }
        assert_eq!(p.declared_len(), n);
        assert_eq!(p.payload(), Some(&b"hello"[..]));
        assert_eq!(p.crc_valid(), Some(true));
    }

    #[test]
    fn declared_length_is_header_plus_remaining() {
        // L = 10: header (4) + exactly 6 more bytes.
        let mut p = Parser::new();
        p.push_slice(&[SYNC, SYNC, 10, 0]);
        for _ in 0..5 {
            assert!(!p.push(0xAB));
        }
        assert!(p.push(0xCD));
        assert_eq!(p.buffered(), 10);
    }

    #[test]
    fn noise_before_header_is_ignored() {
        let mut p = Parser::new();
        for b in [0x00, 0xFF, 0x12, 0x54] {
            p.push(b);
            assert_eq!(p.state(), State::WaitHeader1);
            assert_eq!(p.buffered(), 0);
        }
    }

    #[test]
    fn one_stray_byte_between_sync_bytes_is_skipped() {
        let mut p = Parser::new();
        p.push(SYNC);
        p.push(0x00);
        assert_eq!(p.state(), State::WaitHeader2);
        p.push(SYNC);
        assert_eq!(p.state(), State::WaitLenLsb);
        assert_eq!(p.buffered(), 2);
    }

    #[test]
    fn two_stray_bytes_restart_the_search() {
        let mut p = Parser::new();
        p.push(SYNC);
        p.push(0x00);
        p.push(0x01);
        assert_eq!(p.state(), State::WaitHeader1);
        assert_eq!(p.buffered(), 0);
    }

    #[test]
    fn zero_length_completes_on_header() {
        let mut p = Parser::new();
        assert!(!p.push(SYNC));
        assert!(!p.push(SYNC));
        assert!(!p.push(0));
        assert!(p.push(0));
        assert_eq!(p.payload(), Some(&[][..]));
        assert_eq!(p.crc_valid(), None);

        let mut out = [0u8; 4];
        assert_eq!(p.take(&mut out), 0);
        assert_eq!(p.state(), State::WaitHeader1);
    }

    #[test]
    fn drain_resets_everything() {
        let (frame, n) = frame_of(&[9, 8, 7]);
        let mut p = Parser::new();
        p.push_slice(&frame[..n]);

        let mut out = [0u8; 8];
        assert_eq!(p.take(&mut out), 3);
        assert_eq!(&out[..3], &[9, 8, 7]);

        assert!(!p.new_data());
        assert_eq!(p.buffered(), 0);
        assert_eq!(p.declared_len(), 0);
        assert_eq!(p.state(), State::WaitHeader1);

        // Draining again is a no-op.
        assert_eq!(p.take(&mut out), 0);
    }

    #[test]
    fn bytes_are_dropped_while_frame_pending() {
        let (first, n1) = frame_of(&[1]);
        let (second, n2) = frame_of(&[2]);
        let mut p = Parser::new();

        p.push_slice(&first[..n1]);
        p.push_slice(&second[..n2]);

        let mut out = [0u8; 4];
        assert_eq!(p.take(&mut out), 1);
        assert_eq!(out[0], 1);
        assert!(!p.new_data());
        assert_eq!(p.buffered(), 0);
    }

    #[test]
    fn crc_is_not_checked_before_flagging() {
        let (mut frame, n) = frame_of(&[1, 2, 3]);
        frame[n - 1] ^= 0xFF;

        let mut p = Parser::new();
        assert!(p.push_slice(&frame[..n]));
        assert_eq!(p.crc_valid(), Some(false));
    }

    #[test]
    fn oversized_frame_is_abandoned() {
        let mut p = FrameParser::<16>::new();
        p.push_slice(&[SYNC, SYNC, 17, 0]);
        assert_eq!(p.state(), State::WaitHeader1);
        assert_eq!(p.buffered(), 0);

        let (frame, n) = frame_of(&[0xAA; 10]);
        assert!(p.push_slice(&frame[..n]));
    }

    #[test]
    fn take_truncates_to_output() {
        let (frame, n) = frame_of(b"abcdef");
        let mut p = Parser::new();
        p.push_slice(&frame[..n]);

        let mut out = [0u8; 4];
        assert_eq!(p.take(&mut out), 4);
        assert_eq!(&out, b"abcd");
        assert!(!p.new_data());
    }
}
