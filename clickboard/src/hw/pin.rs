// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! GPIO helpers.
//!
//! - [`NoPin`] stands in for a mikroBUS line that is not wired on the board.
//! - [`Switch`] is an output that remembers its logical state and active level (relays, LEDs,
//!   enable lines).

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Unconnected pin. Writes are dropped, reads return low.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    #[inline]
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

impl InputPin for NoPin {
    #[inline]
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(false)
    }

    #[inline]
    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }
}

/// Whether the output is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// Output abstraction that remembers its active level and last known state.
pub struct Switch<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Switch<PIN> {
    /// Wrap a pin and drive it to the OFF level.
    pub fn new(mut pin: PIN, active: ActiveLevel) -> Result<Self, PIN::Error> {
        match active {
            ActiveLevel::High => pin.set_low()?,
            ActiveLevel::Low => pin.set_high()?,
        };
        Ok(Self {
            pin,
            active,
            is_on: false,
        })
    }

    pub fn active_high(pin: PIN) -> Result<Self, PIN::Error> {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Result<Self, PIN::Error> {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the output logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) -> Result<(), PIN::Error> {
        match (self.active, on) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high()?,
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low()?,
        };
        self.is_on = on;
        Ok(())
    }

    #[inline]
    pub fn on(&mut self) -> Result<(), PIN::Error> {
        self.set(true)
    }

    #[inline]
    pub fn off(&mut self) -> Result<(), PIN::Error> {
        self.set(false)
    }

    pub fn toggle(&mut self) -> Result<(), PIN::Error> {
        self.set(!self.is_on)
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}
