// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `log` sink on the debug USART.
//!
//! Records are formatted straight onto the wire inside a critical section, so logging from
//! interrupt context is safe but slow. Keep it out of tight loops.

use core::cell::RefCell;
use core::fmt::Write;

use cortex_m::interrupt::{self, Mutex};
use log::{LevelFilter, Log, Metadata, Record};
use stm32f7xx_hal::pac::USART3;

use super::usart::Usart;

struct UsartLogger {
    usart: Mutex<RefCell<Option<Usart<USART3>>>>,
}

static LOGGER: UsartLogger = UsartLogger {
    usart: Mutex::new(RefCell::new(None)),
};

impl Log for UsartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        interrupt::free(|cs| {
            if let Some(usart) = self.usart.borrow(cs).borrow_mut().as_mut() {
                let _ = writeln!(usart, "[{:<5}] {}", record.level(), record.args());
            }
        });
    }

    fn flush(&self) {
        interrupt::free(|cs| {
            if let Some(usart) = self.usart.borrow(cs).borrow_mut().as_mut() {
                usart.flush();
            }
        });
    }
}

/// Install the USART as the global logger. Later calls are ignored.
pub fn init(usart: Usart<USART3>, level: LevelFilter) {
    interrupt::free(|cs| LOGGER.usart.borrow(cs).replace(Some(usart)));
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
