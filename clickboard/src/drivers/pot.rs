// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! POT Click: rotary potentiometer on the mikroBUS `AN` pin.

use log::debug;

use crate::error::Error;
use crate::hw::{AnalogIn, AnalogRead, Resolution};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    pub vref: f32,
    pub resolution: Resolution,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vref: 3.3,
            resolution: Resolution::Bits12,
        }
    }
}

impl Config {
    pub fn with_vref(mut self, vref: f32) -> Self {
        self.vref = vref;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }
}

pub struct Pot<A> {
    an: AnalogIn<A>,
}

impl<A: AnalogRead> Pot<A> {
    pub fn init(adc: A, config: &Config) -> Result<Self, Error<A::Error>> {
        debug!("pot: vref {} V, {:?}", config.vref, config.resolution);
        Ok(Self {
            an: AnalogIn::new(adc, config.vref, config.resolution),
        })
    }

    pub fn read_an_pin_value(&mut self) -> Result<u16, Error<A::Error>> {
        self.an.read().map_err(Error::Bus)
    }

    pub fn read_an_pin_voltage(&mut self) -> Result<f32, Error<A::Error>> {
        self.an.read_voltage().map_err(Error::Bus)
    }

    /// Wiper position, 0.0 ..= 100.0.
    pub fn percentage(&mut self) -> Result<f32, Error<A::Error>> {
        let raw = self.read_an_pin_value()?;
        Ok(raw as f32 * 100.0 / self.an.resolution().max_value() as f32)
    }

    pub fn free(self) -> A {
        self.an.free()
    }
}
