// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! GNSS Click: receiver streaming NMEA 0183 over UART.
//!
//! The receiver talks on its own schedule. [`Gnss::process`] collects a burst of output into
//! the driver buffer; the GGA accessors then search that burst.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal_nb::serial::Read;
use log::{debug, trace};

use crate::error::Error;
use crate::hw::serial::SerialConfig;
use crate::hw::NoPin;
use crate::protocol::at::{read_response, ResponseBuffer};
use crate::protocol::nmea::{self, GgaElement};
use crate::protocol::ParseError;

pub const DEFAULT_BUFFER: usize = 600;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub serial: SerialConfig,
    pub read_attempts: u32,
    pub read_interval_ms: u32,
    /// Reject sentences whose `*hh` checksum does not match.
    pub verify_checksum: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::new(9_600),
            read_attempts: 10,
            read_interval_ms: 2,
            verify_checksum: true,
        }
    }
}

impl Config {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.serial.baud_rate = baud_rate;
        self
    }

    pub fn with_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }
}

/// Position from a GGA sentence.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Position {
    /// Decimal degrees, north positive.
    pub latitude: f32,
    /// Decimal degrees, east positive.
    pub longitude: f32,
    /// Meters above mean sea level.
    pub altitude: f32,
    pub satellites: u8,
}

fn parse_field<T: core::str::FromStr>(field: &[u8]) -> Result<T, ParseError> {
    core::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(ParseError::InvalidField)
}

pub struct Gnss<UART, RST = NoPin, const N: usize = DEFAULT_BUFFER> {
    uart: UART,
    rst: RST,
    rx: ResponseBuffer<N>,
    config: Config,
}

impl<UART, RST, const N: usize> Gnss<UART, RST, N>
where
    UART: Read<u8>,
    RST: OutputPin,
{
    /// Take the UART and the active-low reset line, and release the receiver from reset.
    pub fn init(uart: UART, mut rst: RST, config: &Config) -> Result<Self, Error<UART::Error>> {
        rst.set_high().map_err(Error::pin)?;
        debug!("gnss: init at {} baud", config.serial.baud_rate);
        Ok(Self {
            uart,
            rst,
            rx: ResponseBuffer::new(),
            config: *config,
        })
    }

    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<UART::Error>> {
        self.rst.set_low().map_err(Error::pin)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(Error::pin)?;
        delay.delay_ms(1_000);
        self.rx.clear();
        Ok(())
    }

    /// Replace the buffer contents with the receiver's next burst of output.
    pub fn process<D: DelayNs>(&mut self, delay: &mut D) -> Result<usize, Error<UART::Error>> {
        self.rx.clear();
        let n = read_response(
            &mut self.uart,
            delay,
            &mut self.rx,
            self.config.read_attempts,
            self.config.read_interval_ms,
        )
        .map_err(Error::Bus)?;
        trace!("gnss: {} bytes", n);
        Ok(n)
    }

    /// Raw NMEA output of the last burst.
    pub fn buffer(&self) -> &[u8] {
        self.rx.as_bytes()
    }

    fn gga_sentence(&self) -> Result<&[u8], ParseError> {
        let buf = self.rx.as_bytes();
        let sentence = nmea::find_sentence(buf, b"GGA").ok_or(ParseError::NotFound)?;
        if self.config.verify_checksum {
            nmea::verify_checksum(sentence)?;
        }
        Ok(sentence)
    }

    /// One field of the GGA sentence in the last burst.
    pub fn gga_element(&self, which: GgaElement) -> Result<&[u8], Error<UART::Error>> {
        let sentence = self.gga_sentence()?;
        Ok(nmea::element(sentence, which as usize)?)
    }

    /// Fix quality from the GGA sentence; 0 means no fix.
    pub fn fix_quality(&self) -> Result<u8, Error<UART::Error>> {
        Ok(parse_field(self.gga_element(GgaElement::FixQuality)?)?)
    }

    /// Decoded position. Fails with [`Error::NotReady`] while the receiver has no fix.
    pub fn position(&self) -> Result<Position, Error<UART::Error>> {
        let sentence = self.gga_sentence()?;
        let field = |which: GgaElement| nmea::element(sentence, which as usize);

        let quality: u8 = parse_field(field(GgaElement::FixQuality)?)?;
        if quality == 0 {
            return Err(Error::NotReady);
        }

        Ok(Position {
            latitude: nmea::parse_coordinate(
                field(GgaElement::Latitude)?,
                field(GgaElement::LatitudeSide)?,
            )?,
            longitude: nmea::parse_coordinate(
                field(GgaElement::Longitude)?,
                field(GgaElement::LongitudeSide)?,
            )?,
            altitude: parse_field(field(GgaElement::Altitude)?)?,
            satellites: parse_field(field(GgaElement::Satellites)?)?,
        })
    }

    pub fn free(self) -> (UART, RST) {
        (self.uart, self.rst)
    }
}
