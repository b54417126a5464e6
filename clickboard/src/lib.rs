// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Click board drivers
//!
//! This crate contains drivers for mikroBUS Click boards, written in Rust on top of the
//! `embedded-hal` 1.0 traits so that the same driver runs on any MCU with a HAL.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | Bus seams: register access over I2C/SPI, serial helpers, analog inputs, pins |
//! | [`protocol`] | Byte-level protocols: CRC16, framed packets, AT commands, NMEA, Xbus |
//! | [`drivers`] | One module per Click board |
//! | [`error`] | Error type shared by every driver |
//!
//! ## Driver lifecycle
//!
//! Every driver follows the same shape:
//!
//! 1. `Config::default()` fills in the board defaults (bus address, baud rate, reference
//!    voltage, ...). Override fields with the `with_*` setters.
//! 2. `Driver::init(bus, pins, &config)` takes ownership of the handles and checks the device.
//! 3. `default_cfg()` (where present) programs the documented operating mode.
//! 4. Device functions (`temperature()`, `set_duty_cycle()`, ...) do the actual work.
//! 5. `free()` hands the bus and pins back.
//!
//! ```no_run
//! # fn demo<I: embedded_hal::i2c::I2c>(i2c: I) -> Result<(), clickboard::Error<I::Error>> {
//! use clickboard::drivers::c3dhall12i2c::{C3dHall12I2c, Config};
//!
//! let mut hall = C3dHall12I2c::init(i2c, &Config::default())?;
//! hall.default_cfg()?;
//! let celsius = hall.temperature()?;
//! # let _ = celsius;
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod drivers;
pub mod error;
pub mod hw;
pub mod protocol;

pub use error::Error;
