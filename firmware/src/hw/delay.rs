// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SysTick delay exposed through the embedded-hal 1.0 `DelayNs` trait.

use cortex_m::delay::Delay;
use embedded_hal::delay::DelayNs;

pub struct SysDelay(Delay);

impl SysDelay {
    pub fn new(syst: cortex_m::peripheral::SYST, sysclk_hz: u32) -> Self {
        Self(Delay::new(syst, sysclk_hz))
    }
}

impl DelayNs for SysDelay {
    /// SysTick resolution is a microsecond; round up.
    fn delay_ns(&mut self, ns: u32) {
        self.0.delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}
