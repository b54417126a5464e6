// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Bus Seams
//!
//! Thin layer between the `embedded-hal` traits and the Click drivers. Nothing in here knows
//! about a specific MCU; the board crate opens the peripherals and hands them in.
//!
//! - [`i2c`] – register access on a 7-bit I2C slave
//! - [`spi`] – register access on an `SpiDevice` with read/multi-byte flag bits
//! - [`serial`] – blocking writes and non-blocking drains over `embedded-hal-nb` UARTs
//! - [`analog`] – ADC channel seam and raw-to-voltage scaling
//! - [`pin`] – unconnected-pin sentinel and switched outputs

pub mod analog;
pub mod i2c;
#[cfg(test)]
pub(crate) mod mock;
pub mod pin;
pub mod serial;
pub mod spi;

pub use analog::{AnalogIn, AnalogRead, Resolution};
pub use i2c::{I2cRegs, I2cSpeed};
pub use pin::{ActiveLevel, NoPin, Switch};
pub use serial::SerialConfig;
pub use spi::{RegisterFormat, SpiConfig, SpiRegs};
