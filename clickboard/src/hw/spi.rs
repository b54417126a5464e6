// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Serial Peripheral Interface (SPI) register access.
//!
//! - `SpiRegs` wraps an `embedded_hal::spi::SpiDevice` (chip select is handled by the device).
//! - `RegisterFormat` describes how a chip marks reads and burst transfers in the address byte.

use embedded_hal::spi::{Mode, Operation, SpiDevice, MODE_0};
use log::trace;

/// Address-byte convention of an SPI register map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisterFormat {
    /// OR-ed into the address byte for reads.
    pub read_flag: u8,
    /// OR-ed into the address byte for multi-byte transfers.
    pub burst_flag: u8,
    /// Mask applied to the register address before the flags.
    pub addr_mask: u8,
}

impl RegisterFormat {
    /// B7 = R/W (1 = read), B6..B0 = address. Most sensors.
    pub const READ_BIT7: Self = Self {
        read_flag: 0x80,
        burst_flag: 0x00,
        addr_mask: 0x7F,
    };

    /// B7 = R/W (1 = read), B6 = MB (multi-byte), B5..B0 = address.
    pub const READ_BIT7_BURST_BIT6: Self = Self {
        read_flag: 0x80,
        burst_flag: 0x40,
        addr_mask: 0x3F,
    };

    #[inline]
    fn command(&self, reg: u8, read: bool, len: usize) -> u8 {
        let mut cmd = reg & self.addr_mask;
        if read {
            cmd |= self.read_flag;
        }
        if len > 1 {
            cmd |= self.burst_flag;
        }
        cmd
    }
}

impl Default for RegisterFormat {
    fn default() -> Self {
        Self::READ_BIT7
    }
}

/// Bus parameters the board should open the SPI peripheral with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpiConfig {
    pub mode: Mode,
    pub speed_hz: u32,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            mode: MODE_0,
            speed_hz: 1_000_000,
        }
    }
}

/// Wrapper around an `SpiDevice` (8-bit words).
pub struct SpiRegs<SPI> {
    spi: SPI,
    format: RegisterFormat,
}

impl<SPI: SpiDevice> SpiRegs<SPI> {
    pub fn new(spi: SPI, format: RegisterFormat) -> Self {
        Self { spi, format }
    }

    /// Write `data` to consecutive registers starting at `reg`, in one chip-select window.
    pub fn generic_write(&mut self, reg: u8, data: &[u8]) -> Result<(), SPI::Error> {
        let cmd = [self.format.command(reg, false, data.len())];
        trace!("spi write cmd 0x{:02X} len {}", cmd[0], data.len());
        self.spi
            .transaction(&mut [Operation::Write(&cmd), Operation::Write(data)])
    }

    /// Send the read command for `reg`, then clock in `data.len()` bytes.
    pub fn generic_read(&mut self, reg: u8, data: &mut [u8]) -> Result<(), SPI::Error> {
        let cmd = [self.format.command(reg, true, data.len())];
        trace!("spi read cmd 0x{:02X} len {}", cmd[0], data.len());
        self.spi
            .transaction(&mut [Operation::Write(&cmd), Operation::Read(data)])
    }

    #[inline]
    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SPI::Error> {
        self.generic_write(reg, &[value])
    }

    pub fn read_reg(&mut self, reg: u8) -> Result<u8, SPI::Error> {
        let mut buf = [0u8; 1];
        self.generic_read(reg, &mut buf)?;
        Ok(buf[0])
    }

    /// Clock in bytes without sending a command (MOSI idles low).
    ///
    /// Used by converters that stream their result as soon as chip select drops.
    #[inline]
    pub fn read(&mut self, data: &mut [u8]) -> Result<(), SPI::Error> {
        self.spi.read(data)
    }

    #[inline]
    pub fn write(&mut self, data: &[u8]) -> Result<(), SPI::Error> {
        self.spi.write(data)
    }

    /// Transfer a byte buffer in-place.
    #[inline]
    pub fn transfer_in_place(&mut self, buf: &mut [u8]) -> Result<(), SPI::Error> {
        self.spi.transfer_in_place(buf)
    }

    pub fn free(self) -> SPI {
        self.spi
    }
}
