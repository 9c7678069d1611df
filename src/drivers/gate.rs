//! Gate servo driver.
//!
//! Hobby servo on a 50 Hz PWM channel; the gate position is set by the
//! duty cycle (percent of period).  Generic over any `embedded-hal`
//! [`SetDutyCycle`] channel.
//!
//! This driver is a dumb actuator: which duty means "open" is decided by
//! configuration, not here.

use embedded_hal::pwm::SetDutyCycle;

use crate::error::ActuatorError;

pub struct GateServo<P> {
    pwm: P,
    gpio: u8,
    duty_percent: f32,
}

impl<P: SetDutyCycle> GateServo<P> {
    /// Wrap `pwm`.  `gpio` identifies the pin in logs.
    pub fn new(pwm: P, gpio: u8) -> Self {
        Self {
            pwm,
            gpio,
            duty_percent: 0.0,
        }
    }

    /// Set the duty cycle (percent, clamped to 0–100).
    pub fn set_duty(&mut self, percent: f32) -> Result<(), ActuatorError> {
        let percent = percent.clamp(0.0, 100.0);
        let raw = duty_to_raw(percent, self.pwm.max_duty_cycle());
        self.pwm
            .set_duty_cycle(raw)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.duty_percent = percent;
        Ok(())
    }

    pub fn duty(&self) -> f32 {
        self.duty_percent
    }

    pub fn gpio(&self) -> u8 {
        self.gpio
    }
}

/// Percent duty → raw channel units, rounded to the nearest step.
pub fn duty_to_raw(percent: f32, max_duty: u16) -> u16 {
    (f32::from(max_duty) * percent.clamp(0.0, 100.0) / 100.0).round() as u16
}
