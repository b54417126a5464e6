// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! I2C register access.
//!
//! `I2cRegs` pairs an `embedded_hal::i2c::I2c` bus with the 7-bit slave address of one device
//! and provides the register-level `generic_write` / `generic_read` primitives every I2C Click
//! driver is built on.

use embedded_hal::i2c::{I2c, Operation};
use log::trace;

/// Bus clock the board should open the I2C peripheral with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum I2cSpeed {
    /// 100 kHz
    #[default]
    Standard,
    /// 400 kHz
    Fast,
    /// 1 MHz
    FastPlus,
}

impl I2cSpeed {
    pub const fn hz(self) -> u32 {
        match self {
            I2cSpeed::Standard => 100_000,
            I2cSpeed::Fast => 400_000,
            I2cSpeed::FastPlus => 1_000_000,
        }
    }
}

/// I2C bus bound to a single slave address.
pub struct I2cRegs<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cRegs<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Re-target the handle, e.g. after changing the address pins of the board.
    #[inline]
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Write `data` to consecutive registers starting at `reg`.
    ///
    /// The register byte and the payload go out in one write transfer (no repeated start).
    pub fn generic_write(&mut self, reg: u8, data: &[u8]) -> Result<(), I2C::Error> {
        trace!(
            "i2c 0x{:02X} write reg 0x{:02X} len {}",
            self.address,
            reg,
            data.len()
        );
        let reg = [reg];
        self.i2c.transaction(
            self.address,
            &mut [Operation::Write(&reg), Operation::Write(data)],
        )
    }

    /// Read consecutive registers starting at `reg` (write register, repeated start, read).
    pub fn generic_read(&mut self, reg: u8, data: &mut [u8]) -> Result<(), I2C::Error> {
        trace!(
            "i2c 0x{:02X} read reg 0x{:02X} len {}",
            self.address,
            reg,
            data.len()
        );
        self.i2c.write_read(self.address, &[reg], data)
    }

    #[inline]
    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.generic_write(reg, &[value])
    }

    pub fn read_reg(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.generic_read(reg, &mut buf)?;
        Ok(buf[0])
    }

    /// Read a big-endian 16-bit register pair.
    pub fn read_u16_be(&mut self, reg: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.generic_read(reg, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read a little-endian 16-bit register pair.
    pub fn read_u16_le(&mut self, reg: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.generic_read(reg, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Read-modify-write of the bits selected by `mask`.
    pub fn update_reg(&mut self, reg: u8, mask: u8, value: u8) -> Result<(), I2C::Error> {
        let current = self.read_reg(reg)?;
        self.write_reg(reg, (current & !mask) | (value & mask))
    }

    /// Plain write without a register prefix.
    #[inline]
    pub fn write(&mut self, data: &[u8]) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, data)
    }

    /// Plain read without a register prefix.
    #[inline]
    pub fn read(&mut self, data: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.read(self.address, data)
    }

    pub fn free(self) -> I2C {
        self.i2c
    }
}
