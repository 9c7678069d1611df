//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the process logger.  An overlay renderer would implement the same trait.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::Activated {
                category,
                generation,
            } => {
                info!("ACTION | open category={} gen={}", category, generation);
            }
            AppEvent::Closed {
                category,
                generation,
            } => {
                info!("ACTION | close category={} gen={}", category, generation);
            }
            AppEvent::StaleClose {
                category,
                generation,
            } => {
                debug!("ACTION | stale close category={} gen={}", category, generation);
            }
            AppEvent::Suppressed { chosen, dropped } => {
                info!("DECIDE | chosen={} suppressed={}", chosen, dropped);
            }
            AppEvent::FrameSkipped(e) => {
                warn!("FRAME | skipped: {}", e);
            }
            AppEvent::HardwareFault { category, error } => {
                error!("FAULT | category={} {}", category, error);
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | frames={} skipped={} activations={} suppressed={}",
                    t.frames, t.skipped, t.activations, t.suppressed,
                );
            }
            AppEvent::Shutdown => {
                info!("ACTION | all gates closed, indicators off");
            }
        }
    }
}
