//! In-memory output pins for host runs.
//!
//! Implement the `embedded-hal` output traits without touching hardware:
//! every write is tracked in memory and logged, so the full controller can
//! run (and be observed) on a development machine.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType as DigitalErrorType, OutputPin};
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};
use log::debug;

use crate::config::SystemConfig;
use crate::drivers::gate::GateServo;
use crate::drivers::indicator::Indicator;
use crate::pins;

use super::hardware::HardwareAdapter;

/// Simulated digital output.
pub struct SimPin {
    gpio: u8,
    high: bool,
}

impl SimPin {
    pub fn new(gpio: u8) -> Self {
        Self { gpio, high: false }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}

impl DigitalErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.high {
            debug!("sim: GPIO{} -> LOW", self.gpio);
        }
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.high {
            debug!("sim: GPIO{} -> HIGH", self.gpio);
        }
        self.high = true;
        Ok(())
    }
}

/// Simulated PWM channel at the servo frame rate.
pub struct SimPwm {
    gpio: u8,
    raw: u16,
}

impl SimPwm {
    /// 0.01 % duty resolution.
    pub const MAX_DUTY: u16 = 10_000;

    pub fn new(gpio: u8) -> Self {
        Self { gpio, raw: 0 }
    }

    pub fn raw_duty(&self) -> u16 {
        self.raw
    }
}

impl PwmErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        Self::MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if duty != self.raw {
            debug!(
                "sim: GPIO{} PWM@{}Hz duty {}/{}",
                self.gpio,
                pins::SERVO_PWM_FREQ_HZ,
                duty,
                Self::MAX_DUTY
            );
        }
        self.raw = duty;
        Ok(())
    }
}

/// Hardware adapter wired with simulated pins per the configured actuators.
pub fn simulated(config: &SystemConfig) -> HardwareAdapter<SimPin, SimPwm> {
    config
        .actuators
        .iter()
        .fold(HardwareAdapter::new(), |hw, a| {
            hw.with_channel(
                a.category,
                Indicator::new(SimPin::new(a.indicator_gpio), a.indicator_gpio),
                GateServo::new(SimPwm::new(a.gate_gpio), a.gate_gpio),
            )
        })
}
