//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ActuationController / FramePipeline (domain)
//! ```
//!
//! Driven adapters (detector feed, actuators, event sinks, timers)
//! implement these traits.  The domain consumes them via generics, so it
//! never touches hardware directly.
//!
//! Ports that are reached from the close-timer thread as well as the frame
//! loop take `&self` and are `Send + Sync`.

use core::time::Duration;

use crate::category::Category;
use crate::detection::Detection;
use crate::error::{ActuatorError, DetectionError};

// ───────────────────────────────────────────────────────────────
// Detection port (driven adapter: detector → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the pipeline calls this once per frame.
pub trait DetectionSource {
    /// Detections for the next frame.
    ///
    /// * `Ok(Some(..))`: a frame (possibly with no detections).
    /// * `Ok(None)`: the feed is exhausted; the loop should stop.
    /// * `Err(..)`: this frame is unavailable; the loop skips it.
    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>, DetectionError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: fire-and-forget, non-blocking output writes.
pub trait ActuatorPort: Send + Sync {
    /// Drive the category's indicator output.
    fn set_indicator(&self, category: Category, on: bool) -> Result<(), ActuatorError>;

    /// Set the category's gate PWM duty (percent of period).
    fn set_gate_duty(&self, category: Category, duty_percent: f32) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / overlays)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Close timer (delayed, self-invalidating one-shot close)
// ───────────────────────────────────────────────────────────────

/// Receives expired close timers.  Implemented by the actuator bank.
pub trait CloseTarget: Send + Sync {
    /// Close `category` if `generation` is still current.  Returns `true`
    /// when the close took effect, `false` for a stale timer.
    fn expire(&self, category: Category, generation: u64) -> bool;
}

/// Schedules delayed closes.  At most one close per category is pending:
/// arming a category again replaces its previous deadline.
pub trait CloseTimer: Send + Sync {
    /// Arrange for `CloseTarget::expire(category, generation)` after `hold`.
    /// Must return immediately.
    fn arm(&self, category: Category, generation: u64, hold: Duration);

    /// Stop firing.  Pending closes are dropped.
    fn stop(&self);
}
