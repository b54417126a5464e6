// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! THERMO Click (SPI): MAX31855 K-type thermocouple converter.
//!
//! The chip has no registers. Dropping chip select latches a conversion and clocks out one
//! 32-bit frame:
//!
//! | Bits   | Content                                            |
//! | ------ | -------------------------------------------------- |
//! | 31..18 | thermocouple temperature, 14-bit signed, 0.25 °C   |
//! | 16     | fault (any of bits 2..0)                            |
//! | 15..4  | cold-junction temperature, 12-bit signed, 0.0625 °C |
//! | 2..0   | short to VCC, short to GND, open circuit            |

use embedded_hal::spi::SpiDevice;
use log::debug;

use crate::error::Error;
use crate::hw::{RegisterFormat, SpiConfig, SpiRegs};

pub const THERMOCOUPLE_RES: f32 = 0.25;
pub const JUNCTION_RES: f32 = 0.0625;

const FAULT_BIT: u32 = 1 << 16;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub spi: SpiConfig,
}

impl Config {
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.spi.speed_hz = speed_hz;
        self
    }
}

/// Fault bits of the last frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    raw: u8,
}

impl Fault {
    #[inline]
    pub fn raw(&self) -> u8 {
        self.raw
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.raw != 0
    }

    /// Thermocouple shorted to VCC.
    #[inline]
    pub fn short_vcc(&self) -> bool {
        (self.raw & (1 << 2)) != 0
    }

    /// Thermocouple shorted to GND.
    #[inline]
    pub fn short_gnd(&self) -> bool {
        (self.raw & (1 << 1)) != 0
    }

    /// Thermocouple not connected.
    #[inline]
    pub fn open_circuit(&self) -> bool {
        (self.raw & 1) != 0
    }
}

/// Sign-extend the low `bits` bits of `value`.
#[inline]
fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

pub struct Thermo<SPI> {
    regs: SpiRegs<SPI>,
}

impl<SPI: SpiDevice> Thermo<SPI> {
    pub fn init(spi: SPI, config: &Config) -> Result<Self, Error<SPI::Error>> {
        debug!("thermo: init at {} Hz", config.spi.speed_hz);
        Ok(Self {
            regs: SpiRegs::new(spi, RegisterFormat::default()),
        })
    }

    /// One full 32-bit conversion frame.
    pub fn read_raw(&mut self) -> Result<u32, Error<SPI::Error>> {
        let mut buf = [0u8; 4];
        self.regs.read(&mut buf).map_err(Error::Bus)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn fault(&mut self) -> Result<Fault, Error<SPI::Error>> {
        let raw = self.read_raw()?;
        Ok(Fault {
            raw: (raw & 0x07) as u8,
        })
    }

    /// Thermocouple temperature in °C. Fails with [`Error::NotReady`] while a fault is flagged.
    pub fn temperature(&mut self) -> Result<f32, Error<SPI::Error>> {
        let raw = self.read_raw()?;
        if raw & FAULT_BIT != 0 {
            return Err(Error::NotReady);
        }
        Ok(sign_extend(raw >> 18, 14) as f32 * THERMOCOUPLE_RES)
    }

    /// Cold-junction (die) temperature in °C.
    pub fn junction_temperature(&mut self) -> Result<f32, Error<SPI::Error>> {
        let raw = self.read_raw()?;
        Ok(sign_extend((raw >> 4) & 0x0FFF, 12) as f32 * JUNCTION_RES)
    }

    pub fn free(self) -> SPI {
        self.regs.free()
    }
}
