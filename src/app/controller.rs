//! Actuation controller: open, timed hold, auto-close.
//!
//! Per category: **Idle** → `activate` → **Active** → hold expires → **Idle**.
//!
//! ```text
//!  frame loop ──activate──▶ ┌──────────────────────┐ ──arm(g)──▶ CloseTimer
//!                           │  ActuatorBank        │
//!  CloseTimer ──expire(g)─▶ │  registry · outputs  │ ──▶ ActuatorPort
//!                           └──────────────────────┘
//! ```
//!
//! Every activation bumps the category's generation and arms a close for
//! that generation.  A close only acts if its generation is still current,
//! so an earlier hold can never cut a later one short.  The generation
//! check and all output writes for a category happen under that
//! category's registry lock.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::category::Category;
use crate::error::{ActuatorError, Error, Result};
use crate::registry::{ActuatorRegistry, ActuatorState};

use super::events::AppEvent;
use super::ports::{ActuatorPort, CloseTarget, CloseTimer, EventSink};

// ───────────────────────────────────────────────────────────────
// ActuatorBank
// ───────────────────────────────────────────────────────────────

/// Failed writes from one `drive`, emitted once the category lock is
/// released.
type Faults = heapless::Vec<ActuatorError, 2>;

/// Registry plus the outputs it mirrors.  Shared between the frame loop,
/// the close-timer runtime and the shutdown hook.
///
/// Holds the shutdown latch: once [`force_close_all`](Self::force_close_all)
/// has run, [`open`](Self::open) fails under the category lock, so no gate
/// can reopen behind the hook whichever thread it runs on.
pub struct ActuatorBank<H, S> {
    registry: ActuatorRegistry,
    hw: H,
    sink: S,
    shut_down: AtomicBool,
}

impl<H: ActuatorPort, S: EventSink> ActuatorBank<H, S> {
    pub fn new(registry: ActuatorRegistry, hw: H, sink: S) -> Self {
        Self {
            registry,
            hw,
            sink,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Indicator on, gate open, generation bumped.  Returns the new
    /// generation, or `Error::ShutDown` once the shutdown hook has run.
    pub fn open(&self, category: Category) -> Result<u64> {
        let (generation, faults) = self.registry.with_state(category, |duty, state| {
            if self.shut_down.load(Ordering::SeqCst) {
                return Err(Error::ShutDown);
            }
            let faults = self.drive(category, true, duty.open);
            state.indicator_on = true;
            state.gate_duty = duty.open;
            state.generation = state.generation.wrapping_add(1);
            Ok((state.generation, faults))
        })??;
        self.report(category, &faults);
        self.sink.emit(&AppEvent::Activated {
            category,
            generation,
        });
        Ok(generation)
    }

    /// Write the registry's current (closed) state to the outputs.  Called
    /// once at startup so the gates start in a known position.
    pub fn sync_outputs(&self) {
        for category in self.registry.categories() {
            if let Ok(faults) = self.registry.with_state(category, |_, state| {
                self.drive(category, state.indicator_on, state.gate_duty)
            }) {
                self.report(category, &faults);
            }
        }
    }

    /// Shutdown hook: latch shutdown, then drive every registered category
    /// Idle, ignoring generations.  Bumps each generation so closes still
    /// in flight become stale.  Returns `false` if the hook already ran.
    pub fn force_close_all(&self) -> bool {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return false;
        }
        for category in self.registry.categories() {
            if let Ok(faults) = self.registry.with_state(category, |duty, state| {
                let faults = self.drive(category, false, duty.closed);
                state.indicator_on = false;
                state.gate_duty = duty.closed;
                state.generation = state.generation.wrapping_add(1);
                faults
            }) {
                self.report(category, &faults);
            }
        }
        self.sink.emit(&AppEvent::Shutdown);
        true
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &ActuatorRegistry {
        &self.registry
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Write both outputs.  Failures are collected, never propagated: the
    /// caller records the attempted state either way.
    fn drive(&self, category: Category, on: bool, duty: f32) -> Faults {
        let mut faults = Faults::new();
        if let Err(error) = self.hw.set_indicator(category, on) {
            let _ = faults.push(error);
        }
        if let Err(error) = self.hw.set_gate_duty(category, duty) {
            let _ = faults.push(error);
        }
        faults
    }

    /// Emit collected faults.  Must be called without the category lock.
    fn report(&self, category: Category, faults: &[ActuatorError]) {
        for &error in faults {
            self.sink.emit(&AppEvent::HardwareFault { category, error });
        }
    }
}

impl<H: ActuatorPort, S: EventSink> CloseTarget for ActuatorBank<H, S> {
    fn expire(&self, category: Category, generation: u64) -> bool {
        let closed = self.registry.with_state(category, |duty, state| {
            if state.generation != generation {
                return None;
            }
            let faults = self.drive(category, false, duty.closed);
            state.indicator_on = false;
            state.gate_duty = duty.closed;
            Some(faults)
        });

        match closed {
            Ok(Some(faults)) => {
                self.report(category, &faults);
                info!("Close '{}' (gen {})", category, generation);
                self.sink.emit(&AppEvent::Closed {
                    category,
                    generation,
                });
                true
            }
            Ok(None) => {
                debug!("Stale close '{}' (gen {}) ignored", category, generation);
                self.sink.emit(&AppEvent::StaleClose {
                    category,
                    generation,
                });
                false
            }
            Err(e) => {
                warn!("Close timer for unregistered category: {}", e);
                false
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ActuationController
// ───────────────────────────────────────────────────────────────

/// Opens actuators and keeps exactly one close pending per category.
pub struct ActuationController<H: ActuatorPort, S: EventSink, T: CloseTimer> {
    bank: Arc<ActuatorBank<H, S>>,
    timer: T,
    hold: Duration,
}

impl<H: ActuatorPort, S: EventSink, T: CloseTimer> ActuationController<H, S, T> {
    /// `timer` must deliver its expiries to `bank`.
    pub fn new(bank: Arc<ActuatorBank<H, S>>, timer: T, hold: Duration) -> Self {
        Self {
            bank,
            timer,
            hold,
        }
    }

    /// Open `category` now and (re)schedule its close after the hold.
    /// Returns immediately.  Returns the activation's generation.
    /// Fails with `Error::ShutDown` once the bank's shutdown hook has run,
    /// whether it came through [`shutdown`](Self::shutdown) or directly.
    pub fn activate(&self, category: Category) -> Result<u64> {
        let generation = self.bank.open(category)?;
        info!("Activate '{}' (gen {}, hold {:?})", category, generation, self.hold);
        self.timer.arm(category, generation, self.hold);
        Ok(generation)
    }

    /// Shutdown hook: force every actuator Idle, then stop the timers.
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        if self.bank.force_close_all() {
            info!("Actuation shutdown: all gates closed");
        }
        self.timer.stop();
    }

    pub fn is_shut_down(&self) -> bool {
        self.bank.is_shut_down()
    }

    pub fn snapshot(&self, category: Category) -> Result<ActuatorState> {
        self.bank.registry().snapshot(category)
    }

    /// Snapshot of every registered category, in declaration order.
    pub fn states(&self) -> impl Iterator<Item = (Category, ActuatorState)> + '_ {
        let registry = self.bank.registry();
        registry
            .categories()
            .filter_map(move |c| registry.snapshot(c).ok().map(|s| (c, s)))
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    pub fn bank(&self) -> &Arc<ActuatorBank<H, S>> {
        &self.bank
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

impl<H: ActuatorPort, S: EventSink, T: CloseTimer> Drop for ActuationController<H, S, T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
