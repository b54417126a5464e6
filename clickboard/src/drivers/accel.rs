// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Accel Click (SPI): ADXL345 3-axis accelerometer.
//!
//! SPI address byte: B7 = read, B6 = multi-byte, B5..B0 = register.

use embedded_hal::spi::{SpiDevice, MODE_3};
use log::{debug, warn};

use crate::error::Error;
use crate::hw::{RegisterFormat, SpiConfig, SpiRegs};

pub mod reg {
    pub const DEVID: u8 = 0x00;
    pub const BW_RATE: u8 = 0x2C;
    pub const POWER_CTL: u8 = 0x2D;
    pub const INT_SOURCE: u8 = 0x30;
    pub const DATA_FORMAT: u8 = 0x31;
    pub const DATAX0: u8 = 0x32;
}

pub const DEVICE_ID: u8 = 0xE5;

pub const POWER_CTL_MEASURE: u8 = 1 << 3;
pub const DATA_FORMAT_FULL_RES: u8 = 1 << 3;
pub const INT_SOURCE_DATA_READY: u8 = 1 << 7;

/// Acceleration per LSB in full-resolution mode.
pub const G_PER_LSB: f32 = 0.0039;

/// Measurement range (`DATA_FORMAT` bits 1..0).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Range {
    G2 = 0b00,
    G4 = 0b01,
    G8 = 0b10,
    #[default]
    G16 = 0b11,
}

/// Output data rate (`BW_RATE` bits 3..0).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum DataRate {
    Hz25 = 0x08,
    Hz50 = 0x09,
    #[default]
    Hz100 = 0x0A,
    Hz200 = 0x0B,
    Hz400 = 0x0C,
    Hz800 = 0x0D,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub spi: SpiConfig,
    pub range: Range,
    pub rate: DataRate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spi: SpiConfig {
                mode: MODE_3,
                speed_hz: 5_000_000,
            },
            range: Range::G16,
            rate: DataRate::Hz100,
        }
    }
}

impl Config {
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    pub fn with_rate(mut self, rate: DataRate) -> Self {
        self.rate = rate;
        self
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Axes {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Acceleration in g.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

pub struct Accel<SPI> {
    regs: SpiRegs<SPI>,
    config: Config,
}

impl<SPI: SpiDevice> Accel<SPI> {
    /// Take the SPI device and verify the device id.
    pub fn init(spi: SPI, config: &Config) -> Result<Self, Error<SPI::Error>> {
        let mut regs = SpiRegs::new(spi, RegisterFormat::READ_BIT7_BURST_BIT6);
        let id = regs.read_reg(reg::DEVID).map_err(Error::Bus)?;
        if id != DEVICE_ID {
            warn!("accel: unexpected device id 0x{:02X}", id);
            return Err(Error::DeviceId {
                expected: DEVICE_ID,
                found: id,
            });
        }
        debug!("accel: ADXL345 detected");
        Ok(Self {
            regs,
            config: *config,
        })
    }

    /// Full resolution at the configured range and rate, then start measuring.
    pub fn default_cfg(&mut self) -> Result<(), Error<SPI::Error>> {
        let format = DATA_FORMAT_FULL_RES | self.config.range as u8;
        self.generic_write(reg::DATA_FORMAT, &[format])?;
        self.generic_write(reg::BW_RATE, &[self.config.rate as u8])?;
        self.generic_write(reg::POWER_CTL, &[POWER_CTL_MEASURE])?;
        debug!(
            "accel: measuring at {:?}, {:?}",
            self.config.range, self.config.rate
        );
        Ok(())
    }

    pub fn generic_write(&mut self, reg: u8, data: &[u8]) -> Result<(), Error<SPI::Error>> {
        self.regs.generic_write(reg, data).map_err(Error::Bus)
    }

    pub fn generic_read(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Error<SPI::Error>> {
        self.regs.generic_read(reg, data).map_err(Error::Bus)
    }

    pub fn data_ready(&mut self) -> Result<bool, Error<SPI::Error>> {
        let mut src = [0u8];
        self.generic_read(reg::INT_SOURCE, &mut src)?;
        Ok(src[0] & INT_SOURCE_DATA_READY != 0)
    }

    /// Raw axis samples, read in a single burst so all three belong to the same sample.
    pub fn read_axes(&mut self) -> Result<Axes, Error<SPI::Error>> {
        let mut buf = [0u8; 6];
        self.generic_read(reg::DATAX0, &mut buf)?;
        Ok(Axes {
            x: i16::from_le_bytes([buf[0], buf[1]]),
            y: i16::from_le_bytes([buf[2], buf[3]]),
            z: i16::from_le_bytes([buf[4], buf[5]]),
        })
    }

    pub fn acceleration(&mut self) -> Result<Acceleration, Error<SPI::Error>> {
        let a = self.read_axes()?;
        Ok(Acceleration {
            x: a.x as f32 * G_PER_LSB,
            y: a.y as f32 * G_PER_LSB,
            z: a.z as f32 * G_PER_LSB,
        })
    }

    pub fn free(self) -> SPI {
        self.regs.free()
    }
}
