//! Actuator registry: per-category logical actuator state.
//!
//! Pure shared state.  Each category has its own lock so updates for one
//! category are strictly ordered while different categories never
//! contend.  Only the actuation controller mutates entries.
//!
//! ```text
//!   ┌──────────────┬───────────┬───────────┬────────────┐
//!   │ Category     │ indicator │ gate_duty │ generation │
//!   ├──────────────┼───────────┼───────────┼────────────┤
//!   │ Bottle       │ Mutex<ActuatorState>                │
//!   │ Book         │ Mutex<ActuatorState>                │
//!   │ Organic      │ Mutex<ActuatorState>                │
//!   └──────────────┴─────────────────────────────────────┘
//! ```

use std::sync::{Mutex, PoisonError};

use crate::category::Category;
use crate::config::SystemConfig;
use crate::error::{Error, Result};

/// Externally observable actuator phase.  Closing is instantaneous, so
/// there is no intermediate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorPhase {
    /// Indicator off, gate closed.
    Idle,
    /// Indicator on, gate open, close pending.
    Active,
}

/// Logical state of one category's indicator + gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorState {
    pub indicator_on: bool,
    /// Duty (percent) last commanded to the gate.
    pub gate_duty: f32,
    /// Bumped by every activation and by shutdown; a scheduled close only
    /// acts if it still carries the current value.
    pub generation: u64,
}

impl ActuatorState {
    fn closed(duty: GateDuty) -> Self {
        Self {
            indicator_on: false,
            gate_duty: duty.closed,
            generation: 0,
        }
    }

    pub fn phase(&self) -> ActuatorPhase {
        if self.indicator_on {
            ActuatorPhase::Active
        } else {
            ActuatorPhase::Idle
        }
    }
}

/// Open / closed gate duty for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateDuty {
    pub open: f32,
    pub closed: f32,
}

struct Slot {
    duty: GateDuty,
    state: Mutex<ActuatorState>,
}

/// Owned registry, one slot per wired category.  Lives for the whole
/// process and is shared (behind an `Arc`) between the frame loop and the
/// close-timer runtime.
pub struct ActuatorRegistry {
    slots: [Option<Slot>; Category::COUNT],
}

impl ActuatorRegistry {
    /// Build a registry with the given categories, all Idle.
    pub fn new(entries: impl IntoIterator<Item = (Category, GateDuty)>) -> Self {
        let mut slots: [Option<Slot>; Category::COUNT] = core::array::from_fn(|_| None);
        for (category, duty) in entries {
            slots[category.index()] = Some(Slot {
                duty,
                state: Mutex::new(ActuatorState::closed(duty)),
            });
        }
        Self { slots }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.actuators.iter().map(|a| {
            (
                a.category,
                GateDuty {
                    open: a.open_duty_percent,
                    closed: a.closed_duty_percent,
                },
            )
        }))
    }

    pub fn contains(&self, category: Category) -> bool {
        self.slots[category.index()].is_some()
    }

    /// Registered categories in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.contains(*c))
    }

    pub fn duty(&self, category: Category) -> Result<GateDuty> {
        Ok(self.slot(category)?.duty)
    }

    /// Atomic read-modify-write of one category's state.  The lock is held
    /// for the duration of `f`.
    pub fn with_state<R>(
        &self,
        category: Category,
        f: impl FnOnce(GateDuty, &mut ActuatorState) -> R,
    ) -> Result<R> {
        let slot = self.slot(category)?;
        // A panic while holding the lock leaves plain data behind; keep going.
        let mut state = slot.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(slot.duty, &mut state))
    }

    /// Copy of the current state.
    pub fn snapshot(&self, category: Category) -> Result<ActuatorState> {
        self.with_state(category, |_, state| *state)
    }

    fn slot(&self, category: Category) -> Result<&Slot> {
        self.slots[category.index()]
            .as_ref()
            .ok_or(Error::UnknownCategory(category))
    }
}
