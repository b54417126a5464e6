// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! HAL outputs exposed through the embedded-hal 1.0 `OutputPin` trait.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_02::digital::v2::OutputPin as OutputPin02;

/// Wraps an `stm32f7xx-hal` push-pull output such as `PD14<Output<PushPull>>`.
pub struct PushPullPin<P>(P);

impl<P> PushPullPin<P> {
    pub fn new(pin: P) -> Self {
        Self(pin)
    }

    pub fn free(self) -> P {
        self.0
    }
}

impl<P> ErrorType for PushPullPin<P> {
    type Error = Infallible;
}

impl<P: OutputPin02<Error = Infallible>> OutputPin for PushPullPin<P> {
    #[inline]
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set_low()
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set_high()
    }
}
