// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board support: STM32F767 peripherals adapted to the `clickboard` driver seams.

pub mod adc;
pub mod delay;
pub mod gpio;
pub mod logger;
pub mod pins_f767zi;
pub mod serial;
pub mod usart;

pub use adc::{Adc, AdcChannel};
pub use delay::SysDelay;
pub use gpio::PushPullPin;
pub use pins_f767zi::BoardPins;
pub use serial::SerialPort;
pub use usart::Usart;
