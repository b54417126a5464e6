// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Click UART exposed through the `embedded-hal-nb` 1.0 serial traits.

use embedded_hal_nb::serial::{self, ErrorKind, ErrorType};
use stm32f7xx_hal::{
    prelude::*,
    serial::{Error, Instance, Pins, Rx, Serial, Tx},
};

pub struct SerialPort<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> SerialPort<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }
}

fn kind(err: Error) -> ErrorKind {
    match err {
        Error::Overrun => ErrorKind::Overrun,
        Error::Framing => ErrorKind::FrameFormat,
        Error::Parity => ErrorKind::Parity,
        Error::Noise => ErrorKind::Noise,
        #[allow(unreachable_patterns)]
        _ => ErrorKind::Other,
    }
}

impl<U: Instance> ErrorType for SerialPort<U> {
    type Error = ErrorKind;
}

impl<U: Instance> serial::Read<u8> for SerialPort<U> {
    fn read(&mut self) -> nb::Result<u8, ErrorKind> {
        self.rx.read().map_err(|e| e.map(kind))
    }
}

impl<U: Instance> serial::Write<u8> for SerialPort<U> {
    fn write(&mut self, word: u8) -> nb::Result<(), ErrorKind> {
        self.tx.write(word).map_err(|e| e.map(|_| ErrorKind::Other))
    }

    fn flush(&mut self) -> nb::Result<(), ErrorKind> {
        self.tx.flush().map_err(|e| e.map(|_| ErrorKind::Other))
    }
}
