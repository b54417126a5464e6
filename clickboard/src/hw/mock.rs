// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Test doubles for the `embedded-hal` traits.
//!
//! Every double is a cheap `Clone` handle onto shared state, so a test can hand one clone to
//! the driver and keep another to inspect what the driver did.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::{digital, i2c, pwm, spi};
use embedded_hal_nb::serial;

// ── I2C ─────────────────────────────────────────────────────────────────

struct I2cState {
    regs: [u8; 256],
    writes: Vec<(u8, Vec<u8>)>,
    reg_mask: u8,
    fail: bool,
}

/// Register-file I2C slave. The first written byte of a transaction is the register pointer,
/// further written bytes store at the pointer, reads return from it. Both auto-increment.
#[derive(Clone)]
pub struct MockI2c(Rc<RefCell<I2cState>>);

impl MockI2c {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(I2cState {
            regs: [0; 256],
            writes: Vec::new(),
            reg_mask: 0xFF,
            fail: false,
        })))
    }

    pub fn set_regs(&self, start: u8, data: &[u8]) {
        let mut s = self.0.borrow_mut();
        for (i, &b) in data.iter().enumerate() {
            s.regs[(start as usize + i) & 0xFF] = b;
        }
    }

    pub fn reg(&self, reg: u8) -> u8 {
        self.0.borrow().regs[reg as usize]
    }

    /// Pure write transactions as `(address, bytes)`.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.0.borrow().writes.clone()
    }

    /// Mask applied to the pointer byte (for chips with command bits in it).
    pub fn reg_mask(&self, mask: u8) {
        self.0.borrow_mut().reg_mask = mask;
    }

    pub fn fail(&self, on: bool) {
        self.0.borrow_mut().fail = on;
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = i2c::ErrorKind;
}

impl i2c::I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut s = self.0.borrow_mut();
        if s.fail {
            return Err(i2c::ErrorKind::Other);
        }

        let mut ptr: Option<usize> = None;
        let mut written = Vec::new();
        let mut has_read = false;

        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(data) => {
                    for &b in data.iter() {
                        written.push(b);
                        match ptr {
                            None => ptr = Some((b & s.reg_mask) as usize),
                            Some(p) => {
                                s.regs[p & 0xFF] = b;
                                ptr = Some(p + 1);
                            }
                        }
                    }
                }
                i2c::Operation::Read(buf) => {
                    has_read = true;
                    let mut p = ptr.unwrap_or(0);
                    for b in buf.iter_mut() {
                        *b = s.regs[p & 0xFF];
                        p += 1;
                    }
                    ptr = Some(p);
                }
            }
        }

        if !has_read {
            s.writes.push((address, written));
        }
        Ok(())
    }
}

// ── SPI ─────────────────────────────────────────────────────────────────

struct SpiState {
    regs: [u8; 64],
    rx: VecDeque<u8>,
    commands: Vec<u8>,
    fail: bool,
}

/// SPI device with two personalities: transactions that start with a write are register
/// accesses (address in bits 5..0), anything else clocks bytes out of the `rx` queue.
#[derive(Clone)]
pub struct MockSpi(Rc<RefCell<SpiState>>);

impl MockSpi {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(SpiState {
            regs: [0; 64],
            rx: VecDeque::new(),
            commands: Vec::new(),
            fail: false,
        })))
    }

    pub fn set_regs(&self, start: u8, data: &[u8]) {
        let mut s = self.0.borrow_mut();
        for (i, &b) in data.iter().enumerate() {
            s.regs[(start as usize + i) & 0x3F] = b;
        }
    }

    pub fn reg(&self, reg: u8) -> u8 {
        self.0.borrow().regs[(reg & 0x3F) as usize]
    }

    pub fn queue_rx(&self, data: &[u8]) {
        self.0.borrow_mut().rx.extend(data.iter().copied());
    }

    /// Command bytes of every register transaction, in order.
    pub fn commands(&self) -> Vec<u8> {
        self.0.borrow().commands.clone()
    }

    pub fn fail(&self, on: bool) {
        self.0.borrow_mut().fail = on;
    }
}

impl spi::ErrorType for MockSpi {
    type Error = spi::ErrorKind;
}

impl spi::SpiDevice for MockSpi {
    fn transaction(
        &mut self,
        operations: &mut [spi::Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        let mut s = self.0.borrow_mut();
        if s.fail {
            return Err(spi::ErrorKind::Other);
        }

        let mut ptr: Option<usize> = None;
        let mut started = false;

        for op in operations.iter_mut() {
            match op {
                spi::Operation::Write(data) => {
                    for &b in data.iter() {
                        if !started {
                            started = true;
                            s.commands.push(b);
                            ptr = Some((b & 0x3F) as usize);
                        } else if let Some(p) = ptr {
                            s.regs[p & 0x3F] = b;
                            ptr = Some(p + 1);
                        }
                    }
                }
                spi::Operation::Read(buf) => {
                    started = true;
                    for b in buf.iter_mut() {
                        *b = match ptr {
                            Some(p) => {
                                ptr = Some(p + 1);
                                s.regs[p & 0x3F]
                            }
                            None => s.rx.pop_front().unwrap_or(0),
                        };
                    }
                }
                spi::Operation::Transfer(read, _write) => {
                    started = true;
                    for b in read.iter_mut() {
                        *b = s.rx.pop_front().unwrap_or(0);
                    }
                }
                spi::Operation::TransferInPlace(buf) => {
                    started = true;
                    for b in buf.iter_mut() {
                        *b = s.rx.pop_front().unwrap_or(0);
                    }
                }
                spi::Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}

// ── UART ────────────────────────────────────────────────────────────────

/// Serial port. `None` entries in the receive script read as one `WouldBlock`.
#[derive(Clone, Default)]
pub struct MockSerial {
    rx: Rc<RefCell<VecDeque<Option<u8>>>>,
    tx: Rc<RefCell<Vec<u8>>>,
    fail: Rc<Cell<bool>>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&self, bytes: &[u8]) {
        self.rx.borrow_mut().extend(bytes.iter().map(|&b| Some(b)));
    }

    /// One empty poll before the next injected byte becomes visible.
    pub fn inject_gap(&self) {
        self.rx.borrow_mut().push_back(None);
    }

    pub fn pending(&self) -> usize {
        self.rx.borrow().len()
    }

    pub fn sent(&self) -> Vec<u8> {
        self.tx.borrow().clone()
    }

    pub fn clear_sent(&self) {
        self.tx.borrow_mut().clear();
    }

    pub fn fail(&self, on: bool) {
        self.fail.set(on);
    }
}

impl serial::ErrorType for MockSerial {
    type Error = serial::ErrorKind;
}

impl serial::Read<u8> for MockSerial {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if self.fail.get() {
            return Err(nb::Error::Other(serial::ErrorKind::Other));
        }
        match self.rx.borrow_mut().pop_front() {
            Some(Some(b)) => Ok(b),
            _ => Err(nb::Error::WouldBlock),
        }
    }
}

impl serial::Write<u8> for MockSerial {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        if self.fail.get() {
            return Err(nb::Error::Other(serial::ErrorKind::Other));
        }
        self.tx.borrow_mut().push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

// ── GPIO ────────────────────────────────────────────────────────────────

/// Output records every level it is driven to; input level is set by the test.
#[derive(Clone, Default)]
pub struct MockPin {
    levels: Rc<RefCell<Vec<bool>>>,
    input: Rc<Cell<bool>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set_high(&self) -> bool {
        self.levels.borrow().last().copied().unwrap_or(false)
    }

    pub fn history(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }

    pub fn set_input(&self, high: bool) {
        self.input.set(high);
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

impl digital::InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.input.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.input.get())
    }
}

// ── PWM ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockPwm {
    duty: Rc<Cell<u16>>,
    max: u16,
}

impl MockPwm {
    pub fn new(max: u16) -> Self {
        Self {
            duty: Rc::new(Cell::new(0)),
            max,
        }
    }

    pub fn duty(&self) -> u16 {
        self.duty.get()
    }
}

impl pwm::ErrorType for MockPwm {
    type Error = Infallible;
}

impl pwm::SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.duty.set(duty);
        Ok(())
    }
}

// ── Delay ───────────────────────────────────────────────────────────────

/// Delay that only accumulates the requested time.
#[derive(Default)]
pub struct MockDelay {
    pub elapsed_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}
