// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Analog input seam.
//!
//! The board crate owns the ADC peripheral and exposes one channel per Click `AN` pin through
//! [`AnalogRead`]. Any `FnMut() -> u16` closure is a reader, so a board can hand in
//! `move || adc.borrow_mut().read(ch)` without a wrapper type.
//!
//! Example:
//! ```
//! use clickboard::hw::{AnalogIn, Resolution};
//!
//! let mut an = AnalogIn::new(|| 2048u16, 3.3, Resolution::Bits12);
//! let volts = an.read_voltage().unwrap();
//! assert!((volts - 1.6504).abs() < 1e-3);
//! ```

use core::convert::Infallible;

/// Trait for reading a single ADC channel.
pub trait AnalogRead {
    type Error;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

impl<F> AnalogRead for F
where
    F: FnMut() -> u16,
{
    type Error = Infallible;

    #[inline]
    fn read_raw(&mut self) -> Result<u16, Infallible> {
        Ok(self())
    }
}

/// ADC conversion width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Resolution {
    Bits8,
    Bits10,
    #[default]
    Bits12,
    Bits14,
    Bits16,
}

impl Resolution {
    /// Full-scale code, i.e. `2^bits - 1`.
    pub const fn max_value(self) -> u16 {
        match self {
            Resolution::Bits8 => 0x00FF,
            Resolution::Bits10 => 0x03FF,
            Resolution::Bits12 => 0x0FFF,
            Resolution::Bits14 => 0x3FFF,
            Resolution::Bits16 => 0xFFFF,
        }
    }
}

/// Scale a raw conversion to volts: `raw * vref / full_scale`.
#[inline]
pub fn raw_to_voltage(raw: u16, vref: f32, resolution: Resolution) -> f32 {
    raw as f32 * vref / resolution.max_value() as f32
}

/// One ADC channel together with its reference voltage and resolution.
pub struct AnalogIn<A> {
    adc: A,
    vref: f32,
    resolution: Resolution,
}

impl<A: AnalogRead> AnalogIn<A> {
    pub fn new(adc: A, vref: f32, resolution: Resolution) -> Self {
        Self {
            adc,
            vref,
            resolution,
        }
    }

    /// Raw conversion result, clamped to the configured resolution.
    pub fn read(&mut self) -> Result<u16, A::Error> {
        let raw = self.adc.read_raw()?;
        Ok(raw.min(self.resolution.max_value()))
    }

    pub fn read_voltage(&mut self) -> Result<f32, A::Error> {
        let raw = self.read()?;
        Ok(raw_to_voltage(raw, self.vref, self.resolution))
    }

    #[inline]
    pub fn vref(&self) -> f32 {
        self.vref
    }

    #[inline]
    pub fn set_vref(&mut self, vref: f32) {
        self.vref = vref;
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    #[inline]
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    pub fn free(self) -> A {
        self.adc
    }
}
