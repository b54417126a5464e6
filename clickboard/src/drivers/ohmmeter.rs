// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Ohmmeter Click: resistance measurement with a switched constant-current source.
//!
//! Three GPIOs (S1..S3) each enable one current path through the unknown resistor. The
//! voltage across it is sampled by an MCP3201 12-bit SPI ADC against a 2.048 V reference, so
//! `R = V / I`. [`Ohmmeter::measure`] picks the range automatically: it starts at the highest
//! current and steps down until the reading is no longer saturated.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::{debug, trace};

use crate::error::Error;
use crate::hw::{RegisterFormat, SpiConfig, SpiRegs};

pub const ADC_MAX: u16 = 0x0FFF;

/// Readings at or above this code are treated as saturated.
pub const SATURATION: u16 = 4000;

pub const DEFAULT_VREF: f32 = 2.048;

/// Time for the current source to settle after switching.
pub const SETTLE_MS: u32 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Range {
    /// S1, 1 mA, up to ~2 kΩ.
    Low,
    /// S2, 100 µA, up to ~20 kΩ.
    Mid,
    /// S3, 10 µA, up to ~200 kΩ.
    High,
}

impl Range {
    pub const ALL: [Range; 3] = [Range::Low, Range::Mid, Range::High];

    /// Source current in amperes.
    pub const fn current(self) -> f32 {
        match self {
            Range::Low => 1.0e-3,
            Range::Mid => 100.0e-6,
            Range::High => 10.0e-6,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    pub spi: SpiConfig,
    pub vref: f32,
    /// Conversions averaged per reading.
    pub samples: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spi: SpiConfig::default(),
            vref: DEFAULT_VREF,
            samples: 8,
        }
    }
}

impl Config {
    pub fn with_samples(mut self, samples: u8) -> Self {
        self.samples = samples.max(1);
        self
    }

    pub fn with_vref(mut self, vref: f32) -> Self {
        self.vref = vref;
        self
    }
}

/// Range select outputs.
pub struct RangePins<S1, S2, S3> {
    pub s1: S1,
    pub s2: S2,
    pub s3: S3,
}

/// Extract the 12-bit result from a 16-clock MCP3201 read.
///
/// Two sample clocks and a null bit come first, B11..B0 follow, the last clock repeats B1.
#[inline]
pub fn mcp3201_value(frame: [u8; 2]) -> u16 {
    (u16::from_be_bytes(frame) >> 1) & ADC_MAX
}

pub struct Ohmmeter<SPI, S1, S2, S3> {
    adc: SpiRegs<SPI>,
    pins: RangePins<S1, S2, S3>,
    range: Option<Range>,
    vref: f32,
    samples: u8,
}

impl<SPI, S1, S2, S3> Ohmmeter<SPI, S1, S2, S3>
where
    SPI: SpiDevice,
    S1: OutputPin,
    S2: OutputPin,
    S3: OutputPin,
{
    /// Take the ADC and range pins; all current paths start switched off.
    pub fn init(
        spi: SPI,
        pins: RangePins<S1, S2, S3>,
        config: &Config,
    ) -> Result<Self, Error<SPI::Error>> {
        let mut this = Self {
            adc: SpiRegs::new(spi, RegisterFormat::default()),
            pins,
            range: None,
            vref: config.vref,
            samples: config.samples.max(1),
        };
        this.disable()?;
        debug!("ohmmeter: init, vref {} V", this.vref);
        Ok(this)
    }

    /// Switch every current path off.
    pub fn disable(&mut self) -> Result<(), Error<SPI::Error>> {
        self.pins.s1.set_low().map_err(Error::pin)?;
        self.pins.s2.set_low().map_err(Error::pin)?;
        self.pins.s3.set_low().map_err(Error::pin)?;
        self.range = None;
        Ok(())
    }

    /// Enable exactly one current path.
    pub fn set_range(&mut self, range: Range) -> Result<(), Error<SPI::Error>> {
        self.disable()?;
        match range {
            Range::Low => self.pins.s1.set_high().map_err(Error::pin)?,
            Range::Mid => self.pins.s2.set_high().map_err(Error::pin)?,
            Range::High => self.pins.s3.set_high().map_err(Error::pin)?,
        }
        self.range = Some(range);
        trace!("ohmmeter: range {:?}", range);
        Ok(())
    }

    pub fn range(&self) -> Option<Range> {
        self.range
    }

    /// One ADC conversion.
    pub fn read_adc(&mut self) -> Result<u16, Error<SPI::Error>> {
        let mut frame = [0u8; 2];
        self.adc.read(&mut frame).map_err(Error::Bus)?;
        Ok(mcp3201_value(frame))
    }

    /// Average of the configured number of conversions.
    pub fn read_average(&mut self) -> Result<u16, Error<SPI::Error>> {
        let mut sum = 0u32;
        for _ in 0..self.samples {
            sum += self.read_adc()? as u32;
        }
        Ok((sum / self.samples as u32) as u16)
    }

    /// Resistance in ohms on the currently selected range.
    pub fn resistance(&mut self) -> Result<f32, Error<SPI::Error>> {
        let range = self.range.ok_or(Error::NotReady)?;
        let raw = self.read_average()?;
        if raw >= SATURATION {
            return Err(Error::OutOfRange);
        }
        let volts = raw as f32 * self.vref / ADC_MAX as f32;
        Ok(volts / range.current())
    }

    /// Auto-ranging measurement. Returns the resistance and the range it was measured on;
    /// fails with [`Error::OutOfRange`] if even the smallest current saturates (open input).
    pub fn measure<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(f32, Range), Error<SPI::Error>> {
        for range in Range::ALL {
            self.set_range(range)?;
            delay.delay_ms(SETTLE_MS);
            match self.resistance() {
                Ok(ohms) => return Ok((ohms, range)),
                Err(Error::OutOfRange) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Error::OutOfRange)
    }

    pub fn free(self) -> (SPI, RangePins<S1, S2, S3>) {
        (self.adc.free(), self.pins)
    }
}
