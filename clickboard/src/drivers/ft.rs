// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! FT Click: framed packet link over UART.
//!
//! Outgoing payloads are wrapped as `0x55 0x55 LEN_LO LEN_HI PAYLOAD CRC_LO CRC_HI` (see
//! [`crate::protocol::frame`]). Incoming bytes are fed into a [`FrameParser`] either from the
//! UART receive interrupt ([`Ft::isr_parser`]) or by polling ([`Ft::poll`]). At most one
//! received frame is held; it must be drained with [`Ft::get_data`] before the next one is
//! accepted.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal_nb::serial::{Read, Write};
use log::{debug, trace};

use crate::error::Error;
use crate::hw::serial::{try_read, write_all, SerialConfig};
use crate::hw::NoPin;
use crate::protocol::crc16::Crc16;
use crate::protocol::frame::{FrameParser, HEADER_LEN, OVERHEAD, SYNC};
use crate::protocol::ParseError;

/// Receive buffer size used when none is given.
pub const DEFAULT_BUFFER: usize = 256;

/// Reset pulse width and the time the transceiver needs afterwards.
pub const RESET_PULSE_MS: u32 = 10;
pub const RESET_SETTLE_MS: u32 = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub serial: SerialConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::new(115_200),
        }
    }
}

impl Config {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.serial.baud_rate = baud_rate;
        self
    }
}

/// FT Click on a UART with an optional reset line (active low).
pub struct Ft<UART, RST = NoPin, const N: usize = DEFAULT_BUFFER> {
    uart: UART,
    rst: RST,
    parser: FrameParser<N>,
}

impl<UART, RST, const N: usize> Ft<UART, RST, N>
where
    UART: Read<u8> + Write<u8>,
    RST: OutputPin,
{
    /// Take the UART and reset line and release the transceiver from reset.
    pub fn init(uart: UART, mut rst: RST, config: &Config) -> Result<Self, Error<UART::Error>> {
        rst.set_high().map_err(Error::pin)?;
        debug!(
            "ft: init at {} baud, rx buffer {}",
            config.serial.baud_rate, N
        );
        Ok(Self {
            uart,
            rst,
            parser: FrameParser::new(),
        })
    }

    /// Pulse the reset line and drop any partially received frame.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<UART::Error>> {
        self.rst.set_low().map_err(Error::pin)?;
        delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(Error::pin)?;
        delay.delay_ms(RESET_SETTLE_MS);
        self.parser.reset();
        Ok(())
    }

    /// Frame `payload` and transmit it.
    pub fn send_package(&mut self, payload: &[u8]) -> Result<(), Error<UART::Error>> {
        let total = payload.len() + OVERHEAD;
        if total > u16::MAX as usize {
            return Err(ParseError::Overflow.into());
        }

        let len = (total as u16).to_le_bytes();
        let header: [u8; HEADER_LEN] = [SYNC, SYNC, len[0], len[1]];

        let crc = Crc16::new().update(&header).update(payload).finish();

        write_all(&mut self.uart, &header).map_err(Error::Bus)?;
        write_all(&mut self.uart, payload).map_err(Error::Bus)?;
        write_all(&mut self.uart, &crc.to_le_bytes()).map_err(Error::Bus)?;

        trace!("ft: sent {} bytes, crc 0x{:04X}", payload.len(), crc);
        Ok(())
    }

    /// Feed one received byte. Meant to be called from the UART RX interrupt.
    ///
    /// Returns `true` when this byte completed a frame.
    #[inline]
    pub fn isr_parser(&mut self, byte: u8) -> bool {
        self.parser.push(byte)
    }

    /// Move bytes from the UART into the parser until it runs dry or a frame is complete.
    ///
    /// Returns whether a frame is pending. Bytes after a complete frame stay in the UART.
    pub fn poll(&mut self) -> Result<bool, Error<UART::Error>> {
        while !self.parser.new_data() {
            match try_read(&mut self.uart).map_err(Error::Bus)? {
                Some(byte) => {
                    self.parser.push(byte);
                }
                None => break,
            }
        }
        Ok(self.parser.new_data())
    }

    #[inline]
    pub fn new_data(&self) -> bool {
        self.parser.new_data()
    }

    /// CRC check of the pending frame (`None` if nothing is pending).
    #[inline]
    pub fn crc_valid(&self) -> Option<bool> {
        self.parser.crc_valid()
    }

    /// Copy the pending payload into `out` and rearm the receiver.
    ///
    /// Returns the number of payload bytes copied, 0 if no frame was pending.
    pub fn get_data(&mut self, out: &mut [u8]) -> usize {
        self.parser.take(out)
    }

    /// Receive-side state, for diagnostics.
    pub fn parser(&self) -> &FrameParser<N> {
        &self.parser
    }

    pub fn free(self) -> (UART, RST) {
        (self.uart, self.rst)
    }
}
