// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Click Drivers
//!
//! One module per Click board. Each sits on top of the `hw/` seams (and `protocol/` for the
//! UART boards) and exposes `Config`, `init`, device functions and `free`.
//!
//! ## I2C
//!
//! - [`c3dhall12i2c`] – 3D Hall 12, 3-axis Hall sensor with temperature
//! - [`color`] – Color, TCS3471 RGBC light sensor with HSL conversion
//!
//! ## SPI
//!
//! - [`accel`] – Accel, ADXL345 accelerometer
//! - [`ohmmeter`] – Ohmmeter, MCP3201 ADC with auto-ranging current source
//! - [`thermo`] – THERMO, MAX31855 thermocouple converter
//!
//! ## UART
//!
//! - [`ft`] – FT, framed packet link with CRC16
//! - [`gnss`] – GNSS, NMEA receiver
//! - [`gsm`] – GSM, AT-command cellular modem
//! - [`xsensmti3`] – MTi-3 AHRS, Xbus orientation module
//!
//! ## Analog, PWM and GPIO
//!
//! - [`dcmotor`] – DC MOTOR, H-bridge with PWM speed control
//! - [`pot`] – POT, potentiometer on the `AN` pin
//! - [`relay`] – RELAY, two relay outputs

pub mod accel;
pub mod c3dhall12i2c;
pub mod color;
pub mod dcmotor;
pub mod ft;
pub mod gnss;
pub mod gsm;
pub mod ohmmeter;
pub mod pot;
pub mod relay;
pub mod thermo;
pub mod xsensmti3;

pub use accel::Accel;
pub use c3dhall12i2c::C3dHall12I2c;
pub use color::ColorClick;
pub use dcmotor::DcMotor;
pub use ft::Ft;
pub use gnss::Gnss;
pub use gsm::Gsm;
pub use ohmmeter::Ohmmeter;
pub use pot::Pot;
pub use relay::Relay;
pub use thermo::Thermo;
pub use xsensmti3::XsensMti3;
