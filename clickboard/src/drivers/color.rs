// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Color Click (I2C): TCS3471 RGB + clear light sensor.
//!
//! Every register access is prefixed with a command byte: bit 7 set, bits 6..5 = transaction
//! type (auto-increment for block reads), bits 4..0 = register.

use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::error::Error;
use crate::hw::{I2cRegs, I2cSpeed};

pub mod reg {
    pub const ENABLE: u8 = 0x00;
    pub const ATIME: u8 = 0x01;
    pub const WTIME: u8 = 0x03;
    pub const CONTROL: u8 = 0x0F;
    pub const ID: u8 = 0x12;
    pub const STATUS: u8 = 0x13;
    /// Clear, red, green, blue; 16-bit little-endian each.
    pub const CDATA: u8 = 0x14;
}

pub mod cmd {
    pub const COMMAND: u8 = 0x80;
    pub const AUTO_INCREMENT: u8 = 0x20;
}

pub const ENABLE_PON: u8 = 1 << 0;
pub const ENABLE_AEN: u8 = 1 << 1;
pub const ENABLE_WEN: u8 = 1 << 3;
pub const STATUS_AVALID: u8 = 1 << 0;

/// `ID` of TCS34711/TCS34715 and TCS34713/TCS34717.
pub const DEVICE_IDS: [u8; 2] = [0x14, 0x1D];

pub const DEFAULT_ADDRESS: u8 = 0x29;

/// Below this clear count the reading is too dark to classify.
pub const MIN_CLEAR: u16 = 16;

/// Saturation under which a reading is treated as white/gray.
pub const MIN_SATURATION: f32 = 0.08;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Gain {
    #[default]
    X1 = 0b00,
    X4 = 0b01,
    X16 = 0b10,
    X60 = 0b11,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub address: u8,
    pub speed: I2cSpeed,
    /// RGBC integration time, `(256 - atime) * 2.4 ms`.
    pub atime: u8,
    /// Wait time between cycles, `(256 - wtime) * 2.4 ms`.
    pub wtime: u8,
    pub gain: Gain,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            speed: I2cSpeed::Standard,
            atime: 0xD5,
            wtime: 0xFF,
            gain: Gain::X1,
        }
    }
}

impl Config {
    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_integration(mut self, atime: u8) -> Self {
        self.atime = atime;
        self
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgbc {
    pub clear: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// Hue in degrees (`0..360`), saturation and lightness in `0..=1`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Pink,
    /// White, gray or too dark.
    None,
}

impl Color {
    pub fn from_hsl(hsl: &Hsl) -> Self {
        if hsl.saturation < MIN_SATURATION {
            return Color::None;
        }
        match hsl.hue {
            h if h < 15.0 => Color::Red,
            h if h < 45.0 => Color::Orange,
            h if h < 70.0 => Color::Yellow,
            h if h < 165.0 => Color::Green,
            h if h < 195.0 => Color::Cyan,
            h if h < 255.0 => Color::Blue,
            h if h < 290.0 => Color::Purple,
            h if h < 345.0 => Color::Pink,
            _ => Color::Red,
        }
    }
}

/// Convert normalized RGB (`0..=1`, values above 1 are clamped) to HSL.
pub fn rgb_to_hsl(red: f32, green: f32, blue: f32) -> Hsl {
    let r = red.clamp(0.0, 1.0);
    let g = green.clamp(0.0, 1.0);
    let b = blue.clamp(0.0, 1.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;
    let diff = max - min;

    if diff <= f32::EPSILON {
        return Hsl {
            hue: 0.0,
            saturation: 0.0,
            lightness,
        };
    }

    let saturation = if lightness < 0.5 {
        diff / (max + min)
    } else {
        diff / (2.0 - max - min)
    };

    let sector = if max == r {
        (g - b) / diff
    } else if max == g {
        2.0 + (b - r) / diff
    } else {
        4.0 + (r - g) / diff
    };
    let mut hue = sector * 60.0;
    if hue < 0.0 {
        hue += 360.0;
    }

    Hsl {
        hue,
        saturation,
        lightness,
    }
}

pub struct ColorClick<I2C> {
    regs: I2cRegs<I2C>,
    config: Config,
}

impl<I2C: I2c> ColorClick<I2C> {
    /// Take the bus and check the `ID` register.
    pub fn init(i2c: I2C, config: &Config) -> Result<Self, Error<I2C::Error>> {
        let mut this = Self {
            regs: I2cRegs::new(i2c, config.address),
            config: *config,
        };
        let id = this.read_reg(reg::ID)?;
        if !DEVICE_IDS.contains(&id) {
            warn!("color: unexpected id 0x{:02X}", id);
            return Err(Error::DeviceId {
                expected: DEVICE_IDS[0],
                found: id,
            });
        }
        debug!("color: TCS3471 id 0x{:02X}", id);
        Ok(this)
    }

    /// Program timing and gain, then power on with the RGBC engine running.
    pub fn default_cfg(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg(reg::ATIME, self.config.atime)?;
        self.write_reg(reg::WTIME, self.config.wtime)?;
        self.write_reg(reg::CONTROL, self.config.gain as u8)?;
        self.write_reg(reg::ENABLE, ENABLE_PON | ENABLE_AEN | ENABLE_WEN)?;
        Ok(())
    }

    /// Block write starting at `reg` (auto-increment).
    pub fn generic_write(&mut self, reg: u8, data: &[u8]) -> Result<(), Error<I2C::Error>> {
        self.regs
            .generic_write(cmd::COMMAND | cmd::AUTO_INCREMENT | reg, data)
            .map_err(Error::Bus)
    }

    /// Block read starting at `reg` (auto-increment).
    pub fn generic_read(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.regs
            .generic_read(cmd::COMMAND | cmd::AUTO_INCREMENT | reg, data)
            .map_err(Error::Bus)
    }

    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.regs
            .write_reg(cmd::COMMAND | reg, value)
            .map_err(Error::Bus)
    }

    pub fn read_reg(&mut self, reg: u8) -> Result<u8, Error<I2C::Error>> {
        self.regs.read_reg(cmd::COMMAND | reg).map_err(Error::Bus)
    }

    pub fn data_ready(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.read_reg(reg::STATUS)? & STATUS_AVALID != 0)
    }

    pub fn read_rgbc(&mut self) -> Result<Rgbc, Error<I2C::Error>> {
        let mut buf = [0u8; 8];
        self.generic_read(reg::CDATA, &mut buf)?;
        let ch = |i: usize| u16::from_le_bytes([buf[i], buf[i + 1]]);
        Ok(Rgbc {
            clear: ch(0),
            red: ch(2),
            green: ch(4),
            blue: ch(6),
        })
    }

    /// HSL of the current reading with each channel normalized to the clear channel.
    pub fn hsl(&mut self) -> Result<Hsl, Error<I2C::Error>> {
        let c = self.read_rgbc()?;
        if c.clear < MIN_CLEAR {
            return Err(Error::NotReady);
        }
        let clear = c.clear as f32;
        Ok(rgb_to_hsl(
            c.red as f32 / clear,
            c.green as f32 / clear,
            c.blue as f32 / clear,
        ))
    }

    /// Dominant color of the current reading. Too-dark readings give [`Color::None`].
    pub fn color(&mut self) -> Result<Color, Error<I2C::Error>> {
        match self.hsl() {
            Ok(hsl) => Ok(Color::from_hsl(&hsl)),
            Err(Error::NotReady) => Ok(Color::None),
            Err(e) => Err(e),
        }
    }

    pub fn free(self) -> I2C {
        self.regs.free()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::MockI2c;

    fn sensor() -> MockI2c {
        let bus = MockI2c::new();
        bus.reg_mask(0x1F);
        bus.set_regs(reg::ID, &[0x14]);
        bus
    }

    fn set_rgbc(bus: &MockI2c, c: u16, r: u16, g: u16, b: u16) {
        let mut data = [0u8; 8];
        for (i, v) in [c, r, g, b].iter().enumerate() {
            data[2 * i..2 * i + 2].copy_from_slice(&v.to_le_bytes());
        }
        bus.set_regs(reg::CDATA, &data);
    }

    #[test]
    fn hsl_primaries() {
        let red = rgb_to_hsl(1.0, 0.0, 0.0);
        assert_eq!((red.hue, red.saturation, red.lightness), (0.0, 1.0, 0.5));

        let green = rgb_to_hsl(0.0, 1.0, 0.0);
        assert_eq!(green.hue, 120.0);

        let blue = rgb_to_hsl(0.0, 0.0, 1.0);
        assert_eq!(blue.hue, 240.0);

        let magenta = rgb_to_hsl(1.0, 0.0, 1.0);
        assert_eq!(magenta.hue, 300.0);
    }

    #[test]
    fn hsl_gray_has_no_hue() {
        let gray = rgb_to_hsl(0.5, 0.5, 0.5);
        assert_eq!(gray.saturation, 0.0);
        assert_eq!(gray.lightness, 0.5);
        assert_eq!(Color::from_hsl(&gray), Color::None);
    }

    #[test]
    fn hsl_light_color() {
        // #FF8080: lightness 0.75, saturation 1.0
        let hsl = rgb_to_hsl(1.0, 0.5, 0.5);
        assert!((hsl.lightness - 0.75).abs() < 1e-6);
        assert!((hsl.saturation - 1.0).abs() < 1e-6);
    }

    fn at(hue: f32) -> Color {
        let hsl = Hsl {
            hue,
            saturation: 0.5,
            lightness: 0.5,
        };
        Color::from_hsl(&hsl)
    }

    #[test]
    fn classification_bands() {
        assert_eq!(at(5.0), Color::Red);
        assert_eq!(at(350.0), Color::Red);
        assert_eq!(at(30.0), Color::Orange);
        assert_eq!(at(60.0), Color::Yellow);
        assert_eq!(at(120.0), Color::Green);
        assert_eq!(at(180.0), Color::Cyan);
        assert_eq!(at(240.0), Color::Blue);
        assert_eq!(at(270.0), Color::Purple);
        assert_eq!(at(320.0), Color::Pink);
    }

    #[test]
    fn init_checks_id() {
        let bus = MockI2c::new();
        bus.reg_mask(0x1F);
        bus.set_regs(reg::ID, &[0x44]);
        assert_eq!(
            ColorClick::init(bus, &Config::default()).err(),
            Some(Error::DeviceId {
                expected: 0x14,
                found: 0x44
            })
        );
    }

    #[test]
    fn default_cfg_writes() {
        let bus = sensor();
        let cfg = Config::default().with_gain(Gain::X16);
        let mut click = ColorClick::init(bus.clone(), &cfg).unwrap();
        click.default_cfg().unwrap();

        let writes: Vec<Vec<u8>> = bus.writes().into_iter().map(|(_, w)| w).collect();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[0], [0x81, 0xD5]);
        assert_eq!(writes[1], [0x83, 0xFF]);
        assert_eq!(writes[2], [0x8F, 0x02]);
        assert_eq!(writes[3], [0x80, 0x0B]);
    }

    #[test]
    fn reads_rgbc_block_and_classifies() {
        let bus = sensor();
        set_rgbc(&bus, 1000, 200, 800, 180);
        let mut click = ColorClick::init(bus.clone(), &Config::default()).unwrap();

        let c = click.read_rgbc().unwrap();
        assert_eq!((c.clear, c.red, c.green, c.blue), (1000, 200, 800, 180));
        assert_eq!(click.color().unwrap(), Color::Green);
    }

    #[test]
    fn dark_reading_is_no_color() {
        let bus = sensor();
        set_rgbc(&bus, 3, 1, 1, 0);
        let mut click = ColorClick::init(bus, &Config::default()).unwrap();
        assert_eq!(click.hsl(), Err(Error::NotReady));
        assert_eq!(click.color().unwrap(), Color::None);
    }
}
