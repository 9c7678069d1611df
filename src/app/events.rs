//! Outbound application events.
//!
//! The controller and pipeline emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (console log, overlay renderer).

use crate::category::{Category, CategorySet};
use crate::error::{ActuatorError, DetectionError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A category's gate opened (or its hold was extended).
    Activated { category: Category, generation: u64 },

    /// A hold expired and the category returned to Idle.
    Closed { category: Category, generation: u64 },

    /// A close fired for a superseded activation and was ignored.
    StaleClose { category: Category, generation: u64 },

    /// Lower-priority categories detected this frame were not actuated.
    Suppressed { chosen: Category, dropped: CategorySet },

    /// The detection feed failed; the frame was skipped.
    FrameSkipped(DetectionError),

    /// An output write failed.  Logical state keeps the attempted value.
    HardwareFault { category: Category, error: ActuatorError },

    /// Periodic pipeline counters.
    Telemetry(TelemetryData),

    /// Every actuator was forced Idle.
    Shutdown,
}

/// Pipeline counters since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryData {
    pub frames: u64,
    pub skipped: u64,
    pub activations: u64,
    pub suppressed: u64,
}
