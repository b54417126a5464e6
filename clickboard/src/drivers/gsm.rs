// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! GSM Click: cellular modem driven with AT commands.
//!
//! The modem is switched on by holding `PWRKEY` active for about a second. Commands are sent
//! with the `send_cmd*` family; output is collected with [`Gsm::read_response`] into the
//! driver's response buffer, which the caller inspects or classifies.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal_nb::serial::{Read, Write};
use log::{debug, info, warn};

use crate::error::Error;
use crate::hw::serial::{write_all, SerialConfig};
use crate::hw::NoPin;
use crate::protocol::at::{self, Response, ResponseBuffer};

pub mod cmd {
    pub const AT: &str = "AT";
    pub const ECHO_OFF: &str = "ATE0";
    pub const SIGNAL_QUALITY: &str = "AT+CSQ";
    pub const SMS_FORMAT: &str = "AT+CMGF";
    pub const SMS_SEND: &str = "AT+CMGS";
    pub const NETWORK_REGISTRATION: &str = "AT+CREG";
}

/// Ends the SMS body (Ctrl-Z).
pub const CTRL_Z: u8 = 0x1A;

pub const DEFAULT_BUFFER: usize = 256;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub serial: SerialConfig,
    /// How long `PWRKEY` is held active.
    pub power_pulse_ms: u32,
    /// Boot time after the power pulse.
    pub boot_ms: u32,
    /// Consecutive empty polls that end a response.
    pub read_attempts: u32,
    /// Wait after each empty poll.
    pub read_interval_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::new(9_600),
            power_pulse_ms: 1_000,
            boot_ms: 3_000,
            read_attempts: 20,
            read_interval_ms: 5,
        }
    }
}

impl Config {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.serial.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timing(mut self, attempts: u32, interval_ms: u32) -> Self {
        self.read_attempts = attempts;
        self.read_interval_ms = interval_ms;
        self
    }
}

pub struct Gsm<UART, PWR = NoPin, const N: usize = DEFAULT_BUFFER> {
    uart: UART,
    pwr: PWR,
    rx: ResponseBuffer<N>,
    config: Config,
}

impl<UART, PWR, const N: usize> Gsm<UART, PWR, N>
where
    UART: Read<u8> + Write<u8>,
    PWR: OutputPin,
{
    pub fn init(uart: UART, mut pwr: PWR, config: &Config) -> Result<Self, Error<UART::Error>> {
        pwr.set_low().map_err(Error::pin)?;
        debug!("gsm: init at {} baud", config.serial.baud_rate);
        Ok(Self {
            uart,
            pwr,
            rx: ResponseBuffer::new(),
            config: *config,
        })
    }

    /// Pulse `PWRKEY` and wait for the modem to boot.
    pub fn power_on<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<UART::Error>> {
        self.pwr.set_high().map_err(Error::pin)?;
        delay.delay_ms(self.config.power_pulse_ms);
        self.pwr.set_low().map_err(Error::pin)?;
        delay.delay_ms(self.config.boot_ms);
        info!("gsm: powered on");
        Ok(())
    }

    pub fn send_cmd(&mut self, cmd: &str) -> Result<(), Error<UART::Error>> {
        at::write_command(&mut self.uart, cmd).map_err(Error::Bus)
    }

    pub fn send_cmd_with_params(
        &mut self,
        cmd: &str,
        params: &str,
    ) -> Result<(), Error<UART::Error>> {
        at::write_command_with_params(&mut self.uart, cmd, params).map_err(Error::Bus)
    }

    pub fn send_cmd_check(&mut self, cmd: &str) -> Result<(), Error<UART::Error>> {
        at::write_command_check(&mut self.uart, cmd).map_err(Error::Bus)
    }

    /// Append whatever the modem sends until the line goes quiet. Returns the byte count.
    pub fn read_response<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<usize, Error<UART::Error>> {
        let n = at::read_response(
            &mut self.uart,
            delay,
            &mut self.rx,
            self.config.read_attempts,
            self.config.read_interval_ms,
        )
        .map_err(Error::Bus)?;
        if self.rx.is_full() {
            warn!("gsm: response buffer full, output truncated");
        }
        Ok(n)
    }

    /// Clear the buffer, send `cmd` and collect the answer.
    pub fn command<D: DelayNs>(
        &mut self,
        delay: &mut D,
        cmd: &str,
    ) -> Result<Response, Error<UART::Error>> {
        self.rx.clear();
        self.send_cmd(cmd)?;
        self.read_response(delay)?;
        Ok(self.rx.response())
    }

    /// Clear the buffer, send `cmd=params` and collect the answer.
    pub fn command_with_params<D: DelayNs>(
        &mut self,
        delay: &mut D,
        cmd: &str,
        params: &str,
    ) -> Result<Response, Error<UART::Error>> {
        self.rx.clear();
        self.send_cmd_with_params(cmd, params)?;
        self.read_response(delay)?;
        Ok(self.rx.response())
    }

    /// Switch SMS handling to text mode (`AT+CMGF=1`).
    pub fn set_sms_text_mode<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<Response, Error<UART::Error>> {
        self.command_with_params(delay, cmd::SMS_FORMAT, "1")
    }

    /// Send a text-mode SMS. Fails with [`Error::Timeout`] if the modem never shows the
    /// `>` prompt.
    pub fn send_sms_text<D: DelayNs>(
        &mut self,
        delay: &mut D,
        number: &str,
        message: &str,
    ) -> Result<Response, Error<UART::Error>> {
        self.rx.clear();
        write_all(&mut self.uart, cmd::SMS_SEND.as_bytes()).map_err(Error::Bus)?;
        write_all(&mut self.uart, b"=\"").map_err(Error::Bus)?;
        write_all(&mut self.uart, number.as_bytes()).map_err(Error::Bus)?;
        write_all(&mut self.uart, b"\"").map_err(Error::Bus)?;
        write_all(&mut self.uart, at::TERMINATOR).map_err(Error::Bus)?;

        self.read_response(delay)?;
        if !self.rx.contains(b">") {
            warn!("gsm: no SMS prompt");
            return Err(Error::Timeout);
        }

        self.rx.clear();
        write_all(&mut self.uart, message.as_bytes()).map_err(Error::Bus)?;
        write_all(&mut self.uart, &[CTRL_Z]).map_err(Error::Bus)?;
        self.read_response(delay)?;
        Ok(self.rx.response())
    }

    /// Bytes collected since the last clear.
    pub fn response(&self) -> &ResponseBuffer<N> {
        &self.rx
    }

    pub fn clear_response(&mut self) {
        self.rx.clear();
    }

    pub fn free(self) -> (UART, PWR) {
        (self.uart, self.pwr)
    }
}
