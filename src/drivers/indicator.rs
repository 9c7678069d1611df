//! Category indicator LED driver.
//!
//! One digital output per category, active HIGH.  Generic over any
//! `embedded-hal` [`OutputPin`], so the same driver runs against real GPIO
//! or the in-memory pins used on the host.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct Indicator<P> {
    pin: P,
    gpio: u8,
    on: bool,
}

impl<P: OutputPin> Indicator<P> {
    /// Wrap `pin`.  `gpio` identifies the pin in logs.
    pub fn new(pin: P, gpio: u8) -> Self {
        Self {
            pin,
            gpio,
            on: false,
        }
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn gpio(&self) -> u8 {
        self.gpio
    }
}
