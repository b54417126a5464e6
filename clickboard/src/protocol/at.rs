// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! AT command transport.
//!
//! Commands go out as ASCII terminated by a carriage return. Responses have no framing the
//! driver can rely on (echo, unsolicited result codes, multi-line payloads), so they are
//! collected by polling the UART into a [`ResponseBuffer`] until the line stays quiet for a
//! number of polls, and then classified by looking for the final result code.

use embedded_hal::delay::DelayNs;
use embedded_hal_nb::serial::{Read, Write};
use log::trace;

use super::ParseError;
use crate::hw::serial::{try_read, write_all};

/// Command terminator.
pub const TERMINATOR: &[u8] = b"\r";

/// Send `cmd` followed by the terminator.
pub fn write_command<U: Write<u8>>(uart: &mut U, cmd: &str) -> Result<(), U::Error> {
    trace!("at > {}", cmd);
    write_all(uart, cmd.as_bytes())?;
    write_all(uart, TERMINATOR)
}

/// Send `cmd=params`, e.g. `AT+CMGF=1`.
pub fn write_command_with_params<U: Write<u8>>(
    uart: &mut U,
    cmd: &str,
    params: &str,
) -> Result<(), U::Error> {
    trace!("at > {}={}", cmd, params);
    write_all(uart, cmd.as_bytes())?;
    write_all(uart, b"=")?;
    write_all(uart, params.as_bytes())?;
    write_all(uart, TERMINATOR)
}

/// Send `cmd=?` to query the supported parameter range.
pub fn write_command_check<U: Write<u8>>(uart: &mut U, cmd: &str) -> Result<(), U::Error> {
    trace!("at > {}=?", cmd);
    write_all(uart, cmd.as_bytes())?;
    write_all(uart, b"=?")?;
    write_all(uart, TERMINATOR)
}

/// Final result code found in a response.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Ok,
    Error,
    /// Neither `OK` nor `ERROR` yet (prompt, partial or unsolicited output).
    Other,
}

impl Response {
    /// Classify raw response bytes.
    ///
    /// `ERROR` anywhere wins (this covers `+CME ERROR: n` and `+CMS ERROR: n`), otherwise a
    /// line consisting of `OK` marks success.
    pub fn classify(bytes: &[u8]) -> Self {
        if find(bytes, b"ERROR").is_some() {
            return Response::Error;
        }
        let ok_line = bytes
            .split(|&b| b == b'\r' || b == b'\n')
            .any(|line| line == b"OK");
        if ok_line {
            Response::Ok
        } else {
            Response::Other
        }
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Fixed-capacity byte accumulator for module output. Bytes past capacity are dropped.
pub struct ResponseBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> ResponseBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    /// Append a byte. Returns `false` if the buffer is full and the byte was dropped.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.len >= N {
            return false;
        }
        self.buf[self.len] = byte;
        self.len += 1;
        true
    }

    /// Append as much of `bytes` as fits. Returns the number stored.
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(N - self.len);
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        n
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn as_str(&self) -> Result<&str, ParseError> {
        core::str::from_utf8(self.as_bytes()).map_err(|_| ParseError::InvalidField)
    }

    pub fn contains(&self, needle: &[u8]) -> bool {
        find(self.as_bytes(), needle).is_some()
    }

    pub fn response(&self) -> Response {
        Response::classify(self.as_bytes())
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for ResponseBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll `uart` into `buf` until `attempts` consecutive polls come back empty, waiting
/// `interval_ms` after each empty poll.
///
/// NUL bytes are stored as `'\r'` so the buffer stays printable. Returns the number of bytes
/// received during the call, including ones dropped because the buffer was full.
pub fn read_response<U, D, const N: usize>(
    uart: &mut U,
    delay: &mut D,
    buf: &mut ResponseBuffer<N>,
    attempts: u32,
    interval_ms: u32,
) -> Result<usize, U::Error>
where
    U: Read<u8>,
    D: DelayNs,
{
    let mut received = 0;
    let mut idle = 0;

    while idle < attempts {
        match try_read(uart)? {
            Some(byte) => {
                idle = 0;
                received += 1;
                buf.push(if byte == 0 { b'\r' } else { byte });
            }
            None => {
                idle += 1;
                delay.delay_ms(interval_ms);
            }
        }
    }

    trace!("at < {} bytes", received);
    Ok(received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::{MockDelay, MockSerial};

    #[test]
    fn command_formats() {
        let mut uart = MockSerial::new();

        write_command(&mut uart, "AT").unwrap();
        assert_eq!(uart.sent(), b"AT\r".to_vec());
        uart.clear_sent();

        write_command_with_params(&mut uart, "AT+CMGF", "1").unwrap();
        assert_eq!(uart.sent(), b"AT+CMGF=1\r".to_vec());
        uart.clear_sent();

        write_command_check(&mut uart, "AT+CBC").unwrap();
        assert_eq!(uart.sent(), b"AT+CBC=?\r".to_vec());
    }

    #[test]
    fn classify_result_codes() {
        assert_eq!(Response::classify(b"AT\r\r\nOK\r\n"), Response::Ok);
        let cme = Response::classify(b"\r\n+CME ERROR: 10\r\n");
        assert_eq!(cme, Response::Error);
        assert_eq!(Response::classify(b"\r\n> "), Response::Other);
        assert_eq!(Response::classify(b"TOKEN\r\n"), Response::Other);
    }

    #[test]
    fn buffer_drops_past_capacity() {
        let mut buf = ResponseBuffer::<4>::new();
        assert_eq!(buf.extend(b"abc"), 3);
        assert!(buf.push(b'd'));
        assert!(!buf.push(b'e'));
        assert!(buf.is_full());
        assert_eq!(buf.as_str(), Ok("abcd"));

        buf.clear();
        assert!(buf.is_empty());
    }

    #[test]
    fn read_response_stops_after_idle_polls() {
        let mut uart = MockSerial::new();
        let mut delay = MockDelay::new();
        uart.inject(b"OK");
        uart.inject_gap();
        uart.inject(b"\r\n");

        let mut buf = ResponseBuffer::<32>::new();
        let n = read_response(&mut uart, &mut delay, &mut buf, 3, 10).unwrap();

        // A single empty poll does not end the read.
        assert_eq!(n, 4);
        assert_eq!(buf.as_bytes(), b"OK\r\n");
        assert_eq!(buf.response(), Response::Ok);
        // One gap plus three idle polls at the end.
        assert_eq!(delay.elapsed_ms(), 40);
    }

    #[test]
    fn read_response_replaces_nul() {
        let mut uart = MockSerial::new();
        let mut delay = MockDelay::new();
        uart.inject(&[b'A', 0, b'B']);

        let mut buf = ResponseBuffer::<8>::new();
        read_response(&mut uart, &mut delay, &mut buf, 1, 1).unwrap();
        assert_eq!(buf.as_bytes(), b"A\rB");
    }

    #[test]
    fn read_response_counts_dropped_bytes() {
        let mut uart = MockSerial::new();
        let mut delay = MockDelay::new();
        uart.inject(b"0123456789");

        let mut buf = ResponseBuffer::<4>::new();
        let n = read_response(&mut uart, &mut delay, &mut buf, 1, 1).unwrap();
        assert_eq!(n, 10);
        assert_eq!(buf.as_bytes(), b"0123");
    }

    #[test]
    fn find_locates_needle() {
        assert_eq!(find(b"+CMGS: 12", b"CMGS"), Some(1));
        assert_eq!(find(b"abc", b"x"), None);
    }
}
