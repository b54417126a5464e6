// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! UART helpers over the `embedded-hal-nb` serial traits.
//!
//! The HAL owns baud rate, parity and stop bits; `SerialConfig` only records what the board
//! should open the port with. Writes block byte-by-byte with `nb::block!`, reads drain whatever
//! the peripheral already holds and return as soon as it would block.

use embedded_hal_nb::serial::{Read, Write};
use nb::block;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StopBits {
    #[default]
    One,
    Two,
}

/// Line settings for a UART Click.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl SerialConfig {
    /// 8N1 at `baud_rate`.
    pub const fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(115_200)
    }
}

/// Write the entire buffer, blocking on each byte.
pub fn write_all<U: Write<u8>>(uart: &mut U, bytes: &[u8]) -> Result<(), U::Error> {
    for &b in bytes {
        block!(uart.write(b))?;
    }
    Ok(())
}

/// Block until the transmitter is drained.
#[inline]
pub fn flush<U: Write<u8>>(uart: &mut U) -> Result<(), U::Error> {
    block!(uart.flush())
}

/// Reads as many bytes as are available, up to `buf.len()`.
///
/// Returns the number of bytes stored. Zero means the receiver was empty.
pub fn read_available<U: Read<u8>>(uart: &mut U, buf: &mut [u8]) -> Result<usize, U::Error> {
    let mut i = 0;
    while i < buf.len() {
        match uart.read() {
            Ok(byte) => {
                buf[i] = byte;
                i += 1;
            }
            Err(nb::Error::WouldBlock) => break,
            Err(nb::Error::Other(e)) => return Err(e),
        }
    }
    Ok(i)
}

/// Single non-blocking read.
#[inline]
pub fn try_read<U: Read<u8>>(uart: &mut U) -> Result<Option<u8>, U::Error> {
    match uart.read() {
        Ok(byte) => Ok(Some(byte)),
        Err(nb::Error::WouldBlock) => Ok(None),
        Err(nb::Error::Other(e)) => Err(e),
    }
}
