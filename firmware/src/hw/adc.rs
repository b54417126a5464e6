// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! ADC1 on the STM32F7 through direct PAC register access.
//!
//! [`Adc::channel`] takes the Click `AN` pin together with its ADC1 channel number and returns an
//! [`AdcChannel`] that plugs into the `clickboard` analog seam. Conversions are blocking
//! single-shot reads.
//!
//! Example:
//! ```no_run
//! let mut pot_in = Adc::adc1(dp.ADC1).channel(pins.mikrobus.an, 3);
//! let raw = pot_in.read_raw();
//! ```

use core::convert::Infallible;

use clickboard::hw::AnalogRead;
use stm32f7xx_hal::pac;

/// Longest sample time, 480 cycles.
const SMP_480_CYCLES: u32 = 0b111;

pub struct Adc {
    adc: pac::ADC1,
}

impl Adc {
    /// Clock and power ADC1: 12-bit, right-aligned, single conversion, PCLK2 / 4.
    pub fn adc1(adc: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        common.ccr.modify(|_, w| w.adcpre().div4());

        adc.cr1.modify(|_, w| w.res().bits(0b00));
        adc.cr2.modify(|_, w| w.cont().clear_bit().align().right());
        // one conversion per regular sequence
        adc.sqr1.modify(|_, w| w.l().bits(0));
        adc.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc }
    }

    /// Dedicate the converter to `pin`, sampled on channel `ch` (0..=9).
    pub fn channel<PIN>(self, pin: PIN, ch: u8) -> AdcChannel<PIN> {
        let adc = &self.adc;
        let smp = SMP_480_CYCLES << (3 * u32::from(ch.min(9)));
        adc.smpr2.modify(|r, w| unsafe { w.bits(r.bits() | smp) });
        adc.sqr3.modify(|_, w| unsafe { w.sq1().bits(ch & 0x1F) });

        AdcChannel {
            adc: self.adc,
            _pin: pin,
        }
    }
}

/// ADC1 bound to a single analog pin.
pub struct AdcChannel<PIN> {
    adc: pac::ADC1,
    _pin: PIN,
}

impl<PIN> AnalogRead for AdcChannel<PIN> {
    type Error = Infallible;

    fn read_raw(&mut self) -> Result<u16, Infallible> {
        let adc = &self.adc;
        adc.cr2.modify(|_, w| w.swstart().set_bit());
        while adc.sr.read().eoc().bit_is_clear() {}
        Ok(adc.dr.read().data().bits())
    }
}
