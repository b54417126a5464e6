// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! RELAY Click: two relays, each switched by one GPIO (active high).

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::error::Error;
use crate::hw::{ActiveLevel, Switch};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    One,
    Two,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Drive level that energizes a coil.
    pub active: ActiveLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active: ActiveLevel::High,
        }
    }
}

impl Config {
    pub fn with_active(mut self, active: ActiveLevel) -> Self {
        self.active = active;
        self
    }
}

pub struct Relay<R1: OutputPin, R2: OutputPin> {
    rel1: Switch<R1>,
    rel2: Switch<R2>,
}

impl<R1: OutputPin, R2: OutputPin> Relay<R1, R2> {
    /// Take both coil pins; both relays start released.
    pub fn init(rel1: R1, rel2: R2, config: &Config) -> Result<Self, Error<Infallible>> {
        let rel1 = Switch::new(rel1, config.active).map_err(Error::pin)?;
        let rel2 = Switch::new(rel2, config.active).map_err(Error::pin)?;
        debug!("relay: init");
        Ok(Self { rel1, rel2 })
    }

    pub fn set(&mut self, ch: Channel, on: bool) -> Result<(), Error<Infallible>> {
        match ch {
            Channel::One => self.rel1.set(on).map_err(Error::pin),
            Channel::Two => self.rel2.set(on).map_err(Error::pin),
        }
    }

    pub fn toggle(&mut self, ch: Channel) -> Result<(), Error<Infallible>> {
        let on = self.is_on(ch);
        self.set(ch, !on)
    }

    pub fn is_on(&self, ch: Channel) -> bool {
        match ch {
            Channel::One => self.rel1.is_on(),
            Channel::Two => self.rel2.is_on(),
        }
    }

    pub fn free(self) -> (R1, R2) {
        (self.rel1.free(), self.rel2.free())
    }
}
