//! Hardware adapter: bridges indicator/gate drivers to [`ActuatorPort`].
//!
//! Owns one indicator + gate pair per wired category, each behind its own
//! lock so writes for different categories never contend.  This is the
//! only module that touches output pins.

use std::sync::{Mutex, PoisonError};

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::info;

use crate::app::ports::ActuatorPort;
use crate::category::Category;
use crate::drivers::gate::GateServo;
use crate::drivers::indicator::Indicator;
use crate::error::ActuatorError;

/// One category's physical outputs.
pub struct ActuatorChannel<P, G> {
    pub indicator: Indicator<P>,
    pub gate: GateServo<G>,
}

/// Concrete adapter that combines all actuator outputs behind the port.
pub struct HardwareAdapter<P, G> {
    channels: [Option<Mutex<ActuatorChannel<P, G>>>; Category::COUNT],
}

impl<P: OutputPin, G: SetDutyCycle> HardwareAdapter<P, G> {
    /// Adapter with nothing wired.
    pub fn new() -> Self {
        Self {
            channels: core::array::from_fn(|_| None),
        }
    }

    /// Wire `category` to an indicator + gate pair (replaces any previous).
    #[must_use]
    pub fn with_channel(mut self, category: Category, indicator: Indicator<P>, gate: GateServo<G>) -> Self {
        info!(
            "Wired '{}': indicator GPIO{}, gate GPIO{}",
            category,
            indicator.gpio(),
            gate.gpio()
        );
        self.channels[category.index()] = Some(Mutex::new(ActuatorChannel { indicator, gate }));
        self
    }

    pub fn is_wired(&self, category: Category) -> bool {
        self.channels[category.index()].is_some()
    }

    /// Current `(indicator_on, gate_duty_percent)` as last written.
    pub fn output_state(&self, category: Category) -> Option<(bool, f32)> {
        self.with_channel_mut(category, |ch| (ch.indicator.is_on(), ch.gate.duty()))
            .ok()
    }

    fn with_channel_mut<R>(
        &self,
        category: Category,
        f: impl FnOnce(&mut ActuatorChannel<P, G>) -> R,
    ) -> Result<R, ActuatorError> {
        let channel = self.channels[category.index()]
            .as_ref()
            .ok_or(ActuatorError::NotWired)?;
        let mut guard = channel.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut guard))
    }
}

impl<P: OutputPin, G: SetDutyCycle> Default for HardwareAdapter<P, G> {
    fn default() -> Self {
        Self::new()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P, G> ActuatorPort for HardwareAdapter<P, G>
where
    P: OutputPin + Send,
    G: SetDutyCycle + Send,
{
    fn set_indicator(&self, category: Category, on: bool) -> Result<(), ActuatorError> {
        self.with_channel_mut(category, |ch| ch.indicator.set(on))?
    }

    fn set_gate_duty(&self, category: Category, duty_percent: f32) -> Result<(), ActuatorError> {
        self.with_channel_mut(category, |ch| ch.gate.set_duty(duty_percent))?
    }
}
