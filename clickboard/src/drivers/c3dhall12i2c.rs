// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! 3D Hall 12 Click (I2C): 3-axis linear Hall sensor with on-chip temperature sensor.
//!
//! The sensor registers are 32 bits wide and transferred MSB first. Measurements are read as
//! one block of four 16-bit words (temperature, X, Y, Z), each holding a right-aligned 12-bit
//! two's-complement value.

#[allow(unused_imports)]
use micromath::F32Ext;

use embedded_hal::i2c::I2c;
use log::debug;

use crate::error::Error;
use crate::hw::{I2cRegs, I2cSpeed};

pub mod reg {
    /// Channel enables, bandwidth and I2C options.
    pub const CONFIG: u8 = 0x02;
    /// Low-power mode and sample count.
    pub const MODE: u8 = 0x27;
    /// Temperature, X, Y, Z block.
    pub const DATA: u8 = 0x28;
    /// Customer access register; unlocks writes to the configuration.
    pub const ACCESS: u8 = 0x35;
}

pub const ACCESS_CODE: u32 = 0x2C41_3534;

/// X, Y and Z channel enable bits of [`reg::CONFIG`].
pub const CONFIG_CHANNELS_XYZ: u32 = 0x0000_01C0;

/// Active (full-power) operation in [`reg::MODE`].
pub const MODE_ACTIVE: u32 = 0x0000_0000;

/// Temperature scale in LSB/°C.
pub const TEMP_RES: f32 = 8.0;
/// Temperature at raw code 0.
pub const TEMP_OFFSET: f32 = 25.0;

const SIGN_BIT: u16 = 0x0800;
const DATA_MASK: u16 = 0x0FFF;

pub const DEFAULT_ADDRESS: u8 = 0x60;

/// Full-scale range of the fitted sensor variant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Range {
    #[default]
    Gauss500,
    Gauss1000,
}

impl Range {
    /// Sensitivity in LSB/gauss.
    pub const fn resolution(self) -> f32 {
        match self {
            Range::Gauss500 => 4.0,
            Range::Gauss1000 => 2.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub address: u8,
    pub speed: I2cSpeed,
    pub range: Range,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            speed: I2cSpeed::Standard,
            range: Range::Gauss500,
        }
    }
}

impl Config {
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }
}

/// Raw conversion results, sign-extended.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RawData {
    pub temperature: i16,
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Magnetic flux density in gauss.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Field {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Sign-extend a right-aligned 12-bit two's-complement value.
#[inline]
pub fn sign_extend_12(raw: u16) -> i16 {
    let v = raw & DATA_MASK;
    if v & SIGN_BIT != 0 {
        (v | !DATA_MASK) as i16
    } else {
        v as i16
    }
}

/// Angle of the `(a, b)` field vector in degrees, in `0..360`.
pub fn angle(a: f32, b: f32) -> f32 {
    let deg = b.atan2(a).to_degrees();
    if deg < 0.0 {
        deg + 360.0
    } else {
        deg
    }
}

pub struct C3dHall12I2c<I2C> {
    regs: I2cRegs<I2C>,
    range: Range,
}

impl<I2C: I2c> C3dHall12I2c<I2C> {
    /// Take the bus and check that the sensor answers at the configured address.
    pub fn init(i2c: I2C, config: &Config) -> Result<Self, Error<I2C::Error>> {
        let mut regs = I2cRegs::new(i2c, config.address);
        let mut ident = [0u8; 4];
        regs.generic_read(reg::MODE, &mut ident)
            .map_err(Error::Bus)?;
        debug!("c3dhall12i2c: found at 0x{:02X}", config.address);
        Ok(Self {
            regs,
            range: config.range,
        })
    }

    /// Unlock the configuration, enable all three channels and select active mode.
    pub fn default_cfg(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_word(reg::ACCESS, ACCESS_CODE)?;
        self.write_word(reg::CONFIG, CONFIG_CHANNELS_XYZ)?;
        self.write_word(reg::MODE, MODE_ACTIVE)?;
        debug!("c3dhall12i2c: configured");
        Ok(())
    }

    pub fn generic_write(&mut self, reg: u8, data: &[u8]) -> Result<(), Error<I2C::Error>> {
        self.regs.generic_write(reg, data).map_err(Error::Bus)
    }

    pub fn generic_read(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.regs.generic_read(reg, data).map_err(Error::Bus)
    }

    /// Write one 32-bit register.
    pub fn write_word(&mut self, reg: u8, value: u32) -> Result<(), Error<I2C::Error>> {
        self.generic_write(reg, &value.to_be_bytes())
    }

    /// Read one 32-bit register.
    pub fn read_word(&mut self, reg: u8) -> Result<u32, Error<I2C::Error>> {
        let mut buf = [0u8; 4];
        self.generic_read(reg, &mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_raw(&mut self) -> Result<RawData, Error<I2C::Error>> {
        let mut buf = [0u8; 8];
        self.generic_read(reg::DATA, &mut buf)?;

        let word = |i: usize| sign_extend_12(u16::from_be_bytes([buf[i], buf[i + 1]]));
        Ok(RawData {
            temperature: word(0),
            x: word(2),
            y: word(4),
            z: word(6),
        })
    }

    /// Die temperature in °C.
    pub fn temperature(&mut self) -> Result<f32, Error<I2C::Error>> {
        let raw = self.read_raw()?;
        Ok(raw.temperature as f32 / TEMP_RES + TEMP_OFFSET)
    }

    /// Flux density on all three axes in gauss.
    pub fn magnetic_field(&mut self) -> Result<Field, Error<I2C::Error>> {
        let raw = self.read_raw()?;
        let res = self.range.resolution();
        Ok(Field {
            x: raw.x as f32 / res,
            y: raw.y as f32 / res,
            z: raw.z as f32 / res,
        })
    }

    /// Field angles in degrees: `(xy, xz, yz)`.
    pub fn angles(&mut self) -> Result<(f32, f32, f32), Error<I2C::Error>> {
        let f = self.magnetic_field()?;
        Ok((angle(f.x, f.y), angle(f.x, f.z), angle(f.y, f.z)))
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn free(self) -> I2C {
        self.regs.free()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::MockI2c;
    use embedded_hal::i2c::ErrorKind;

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend_12(0x07FF), 2047);
        assert_eq!(sign_extend_12(0x0800), -2048);
        assert_eq!(sign_extend_12(0x0FFF), -1);
        // Bits above the 12-bit field are ignored.
        assert_eq!(sign_extend_12(0xF001), 1);
    }

    #[test]
    fn temperature_from_raw() {
        let bus = MockI2c::new();
        bus.set_regs(reg::DATA, &[0x01, 0x40]);
        let mut hall = C3dHall12I2c::init(bus.clone(), &Config::default()).unwrap();

        let t = hall.temperature().unwrap();
        assert_eq!(t, 320.0 / TEMP_RES + TEMP_OFFSET);
        assert_eq!(t, 65.0);
    }

    #[test]
    fn field_scaled_by_range() {
        let bus = MockI2c::new();
        bus.set_regs(reg::DATA, &[0, 0, 0x00, 0x64, 0x0F, 0x9C, 0x00, 0x00]);

        let mut hall = C3dHall12I2c::init(bus.clone(), &Config::default()).unwrap();
        let f = hall.magnetic_field().unwrap();
        assert_eq!((f.x, f.y, f.z), (25.0, -25.0, 0.0));

        let cfg = Config::default().with_range(Range::Gauss1000);
        let mut hall = C3dHall12I2c::init(bus, &cfg).unwrap();
        assert_eq!(hall.magnetic_field().unwrap().x, 50.0);
    }

    #[test]
    fn default_cfg_sequence() {
        let bus = MockI2c::new();
        let mut hall = C3dHall12I2c::init(bus.clone(), &Config::default()).unwrap();
        hall.default_cfg().unwrap();

        assert_eq!(
            bus.writes(),
            vec![
                (DEFAULT_ADDRESS, vec![reg::ACCESS, 0x2C, 0x41, 0x35, 0x34]),
                (DEFAULT_ADDRESS, vec![reg::CONFIG, 0x00, 0x00, 0x01, 0xC0]),
                (DEFAULT_ADDRESS, vec![reg::MODE, 0, 0, 0, 0]),
            ]
        );
    }

    #[test]
    fn default_cfg_stops_at_first_failure() {
        let bus = MockI2c::new();
        let mut hall = C3dHall12I2c::init(bus.clone(), &Config::default()).unwrap();
        bus.fail(true);
        assert_eq!(hall.default_cfg(), Err(Error::Bus(ErrorKind::Other)));
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn init_fails_without_device() {
        let bus = MockI2c::new();
        bus.fail(true);
        assert!(C3dHall12I2c::init(bus, &Config::default()).is_err());
    }

    #[test]
    fn angles() {
        assert!((angle(1.0, 1.0) - 45.0).abs() < 1e-3);
        assert!((angle(0.0, -1.0) - 270.0).abs() < 1e-3);
    }
}
