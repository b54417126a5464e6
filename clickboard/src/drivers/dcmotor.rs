// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! DC MOTOR Click: H-bridge with PWM speed control, two select lines and a sleep input.
//!
//! | IN1 | IN2 | Output              |
//! | --- | --- | ------------------- |
//! | H   | L   | forward             |
//! | L   | H   | reverse             |
//! | H   | H   | brake (short)       |
//! | L   | L   | coast (high-Z)      |

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, trace};

use crate::error::Error;
use crate::hw::NoPin;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
    Brake,
    Coast,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// PWM frequency the board should configure the timer with.
    pub pwm_freq_hz: u32,
    /// Duty cycle applied by `init`, 0.0 ..= 1.0.
    pub initial_duty: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pwm_freq_hz: 5_000,
            initial_duty: 0.0,
        }
    }
}

impl Config {
    pub fn with_frequency(mut self, hz: u32) -> Self {
        self.pwm_freq_hz = hz;
        self
    }
}

/// Control lines besides the PWM output.
pub struct Pins<IN1, IN2, SLP = NoPin> {
    pub in1: IN1,
    pub in2: IN2,
    /// Active-low sleep (`nSLEEP`).
    pub slp: SLP,
}

pub struct DcMotor<PWM, IN1, IN2, SLP = NoPin> {
    pwm: PWM,
    pins: Pins<IN1, IN2, SLP>,
    duty: f32,
    direction: Direction,
}

impl<PWM, IN1, IN2, SLP> DcMotor<PWM, IN1, IN2, SLP>
where
    PWM: SetDutyCycle,
    IN1: OutputPin,
    IN2: OutputPin,
    SLP: OutputPin,
{
    /// Take the PWM channel and pins, wake the bridge and leave the motor coasting.
    pub fn init(
        pwm: PWM,
        pins: Pins<IN1, IN2, SLP>,
        config: &Config,
    ) -> Result<Self, Error<PWM::Error>> {
        let mut this = Self {
            pwm,
            pins,
            duty: 0.0,
            direction: Direction::Coast,
        };
        this.set_direction(Direction::Coast)?;
        this.set_duty_cycle(config.initial_duty)?;
        this.sleep(false)?;
        debug!("dcmotor: init, pwm {} Hz", config.pwm_freq_hz);
        Ok(this)
    }

    pub fn set_direction(&mut self, dir: Direction) -> Result<(), Error<PWM::Error>> {
        let (in1, in2) = match dir {
            Direction::Forward => (true, false),
            Direction::Reverse => (false, true),
            Direction::Brake => (true, true),
            Direction::Coast => (false, false),
        };
        self.pins.in1.set_state(in1.into()).map_err(Error::pin)?;
        self.pins.in2.set_state(in2.into()).map_err(Error::pin)?;
        self.direction = dir;
        trace!("dcmotor: {:?}", dir);
        Ok(())
    }

    #[inline]
    pub fn forward(&mut self) -> Result<(), Error<PWM::Error>> {
        self.set_direction(Direction::Forward)
    }

    #[inline]
    pub fn reverse(&mut self) -> Result<(), Error<PWM::Error>> {
        self.set_direction(Direction::Reverse)
    }

    #[inline]
    pub fn brake(&mut self) -> Result<(), Error<PWM::Error>> {
        self.set_direction(Direction::Brake)
    }

    #[inline]
    pub fn coast(&mut self) -> Result<(), Error<PWM::Error>> {
        self.set_direction(Direction::Coast)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Set the PWM duty cycle, `0.0 ..= 1.0`.
    pub fn set_duty_cycle(&mut self, duty: f32) -> Result<(), Error<PWM::Error>> {
        if !(0.0..=1.0).contains(&duty) {
            return Err(Error::OutOfRange);
        }
        let max = self.pwm.max_duty_cycle() as f32;
        self.pwm
            .set_duty_cycle((duty * max + 0.5) as u16)
            .map_err(Error::Bus)?;
        self.duty = duty;
        Ok(())
    }

    pub fn duty_cycle(&self) -> f32 {
        self.duty
    }

    /// Put the bridge to sleep (outputs off) or wake it up.
    pub fn sleep(&mut self, asleep: bool) -> Result<(), Error<PWM::Error>> {
        let state = PinState::from(!asleep);
        self.pins.slp.set_state(state).map_err(Error::pin)
    }

    /// Coast and zero the duty cycle.
    pub fn stop(&mut self) -> Result<(), Error<PWM::Error>> {
        self.set_direction(Direction::Coast)?;
        self.set_duty_cycle(0.0)
    }

    pub fn free(self) -> (PWM, Pins<IN1, IN2, SLP>) {
        (self.pwm, self.pins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::{MockPin, MockPwm};

    struct Rig {
        pwm: MockPwm,
        in1: MockPin,
        in2: MockPin,
        slp: MockPin,
        motor: DcMotor<MockPwm, MockPin, MockPin, MockPin>,
    }

    fn rig() -> Rig {
        let pwm = MockPwm::new(1000);
        let (in1, in2, slp) = (MockPin::new(), MockPin::new(), MockPin::new());
        let motor = DcMotor::init(
            pwm.clone(),
            Pins {
                in1: in1.clone(),
                in2: in2.clone(),
                slp: slp.clone(),
            },
            &Config::default(),
        )
        .unwrap();
        Rig {
            pwm,
            in1,
            in2,
            slp,
            motor,
        }
    }

    #[test]
    fn init_wakes_and_coasts() {
        let r = rig();
        assert!(r.slp.is_set_high());
        assert!(!r.in1.is_set_high());
        assert!(!r.in2.is_set_high());
        assert_eq!(r.pwm.duty(), 0);
        assert_eq!(r.motor.direction(), Direction::Coast);
    }

    #[test]
    fn direction_truth_table() {
        let mut r = rig();
        for (dir, in1, in2) in [
            (Direction::Forward, true, false),
            (Direction::Reverse, false, true),
            (Direction::Brake, true, true),
            (Direction::Coast, false, false),
        ] {
            r.motor.set_direction(dir).unwrap();
            let state = (r.in1.is_set_high(), r.in2.is_set_high());
            assert_eq!(state, (in1, in2), "{:?}", dir);
        }
    }

    #[test]
    fn duty_cycle_scaling_and_bounds() {
        let mut r = rig();
        r.motor.set_duty_cycle(0.25).unwrap();
        assert_eq!(r.pwm.duty(), 250);
        assert_eq!(r.motor.duty_cycle(), 0.25);

        assert_eq!(r.motor.set_duty_cycle(1.5), Err(Error::OutOfRange));
        assert_eq!(r.motor.set_duty_cycle(-0.1), Err(Error::OutOfRange));
        assert_eq!(r.pwm.duty(), 250);
    }

    #[test]
    fn sleep_is_active_low() {
        let mut r = rig();
        r.motor.sleep(true).unwrap();
        assert!(!r.slp.is_set_high());
        r.motor.sleep(false).unwrap();
        assert!(r.slp.is_set_high());
    }

    #[test]
    fn stop_coasts_at_zero_duty() {
        let mut r = rig();
        r.motor.forward().unwrap();
        r.motor.set_duty_cycle(1.0).unwrap();
        assert_eq!(r.pwm.duty(), 1000);

        r.motor.stop().unwrap();
        assert_eq!(r.pwm.duty(), 0);
        assert_eq!(r.motor.direction(), Direction::Coast);
    }
}
