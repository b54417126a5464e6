// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error type shared by all Click drivers.
//!
//! Driver methods return `Result<T, Error<E>>` where `E` is the error of the bus the driver
//! talks over. Multi-step sequences such as `default_cfg` stop at the first failing step and
//! return its error, so the caller always knows which transaction went wrong.

use core::fmt;

use crate::protocol::ParseError;

/// Driver error, generic over the underlying bus error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// I2C, SPI, UART, PWM or ADC transaction failed.
    Bus(E),
    /// A GPIO line could not be driven or sampled.
    Pin,
    /// Identity register did not hold the expected value.
    DeviceId { expected: u8, found: u8 },
    /// The device has no new conversion result yet.
    NotReady,
    /// Argument or measurement outside the supported range.
    OutOfRange,
    /// The device answered with bytes that could not be decoded.
    Parse(ParseError),
    /// A bounded wait ran out. Returned by
    /// [`Gsm::send_sms_text`](crate::drivers::gsm::Gsm::send_sms_text) when the `>` prompt
    /// never arrives.
    Timeout,
}

impl<E> Error<E> {
    /// Collapse any GPIO error into [`Error::Pin`].
    ///
    /// Used as `pin.set_high().map_err(Error::pin)?`.
    #[inline]
    pub fn pin<P>(_err: P) -> Self {
        Error::Pin
    }
}

impl<E> From<ParseError> for Error<E> {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {:?}", e),
            Error::Pin => f.write_str("gpio error"),
            Error::DeviceId { expected, found } => write!(
                f,
                "unexpected device id 0x{:02X} (expected 0x{:02X})",
                found, expected
            ),
            Error::NotReady => f.write_str("data not ready"),
            Error::OutOfRange => f.write_str("value out of range"),
            Error::Parse(e) => write!(f, "parse error: {}", e),
            Error::Timeout => f.write_str("timeout"),
        }
    }
}
