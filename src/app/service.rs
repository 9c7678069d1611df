//! Frame pipeline: the per-frame orchestration.
//!
//! [`FramePipeline`] owns the label table, priority order and the
//! actuation controller.  Each frame runs detect → classify → resolve →
//! activate.  All I/O flows through port traits, so the whole pipeline is
//! testable with mock adapters.
//!
//! ```text
//!  DetectionSource ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                      │        FramePipeline        │
//!                      │ classify · resolve · counts │
//!                      └──────────────┬──────────────┘
//!                                     ▼
//!                           ActuationController ──▶ ActuatorPort
//! ```

use log::{debug, info, warn};

use crate::category::CategorySet;
use crate::classify::LabelTable;
use crate::config::SystemConfig;
use crate::detection::{Annotation, Detection, FrameDecision};
use crate::error::{DetectionError, Result};
use crate::priority::PriorityOrder;

use super::controller::ActuationController;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, CloseTimer, DetectionSource, EventSink};

/// What one call to [`FramePipeline::process_frame`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The frame was processed.
    Decision(FrameDecision),
    /// The feed failed for this frame; nothing changed.
    Skipped(DetectionError),
    /// The feed has no more frames.
    Exhausted,
}

pub struct FramePipeline<H: ActuatorPort, S: EventSink, T: CloseTimer> {
    labels: LabelTable,
    priority: PriorityOrder,
    min_confidence: f32,
    controller: ActuationController<H, S, T>,
    telemetry: TelemetryData,
    /// Emit counters every this many frames.
    telemetry_interval: u64,
}

impl<H: ActuatorPort, S: EventSink, T: CloseTimer> FramePipeline<H, S, T> {
    pub fn new(config: &SystemConfig, controller: ActuationController<H, S, T>) -> Self {
        Self {
            labels: LabelTable::new(config.labels.clone()),
            priority: PriorityOrder::new(config.priority.clone()),
            min_confidence: config.min_confidence,
            controller,
            telemetry: TelemetryData::default(),
            telemetry_interval: u64::from(config.telemetry_interval_frames).max(1),
        }
    }

    // ── Pure decision ─────────────────────────────────────────

    /// Classify and arbitrate one frame's detections.  No side effects.
    pub fn decide(&self, detections: &[Detection]) -> FrameDecision {
        let annotations: Vec<Annotation> = detections
            .iter()
            .filter(|d| d.confidence >= self.min_confidence)
            .filter_map(|d| {
                self.labels.classify(&d.label).map(|category| Annotation {
                    category,
                    label: d.label.clone(),
                    confidence: d.confidence,
                    bbox: d.bbox,
                })
            })
            .collect();

        let detected: CategorySet = annotations.iter().map(|a| a.category).collect();
        FrameDecision {
            detected,
            chosen: self.priority.resolve(detected),
            suppressed: self.priority.suppressed(detected),
            annotations,
        }
    }

    // ── Per-frame orchestration ───────────────────────────────

    /// Run one frame's detections through the pipeline and actuate the
    /// winner.  Fails only on `UnknownCategory` or after shutdown.
    pub fn handle_detections(&mut self, detections: &[Detection]) -> Result<FrameDecision> {
        self.telemetry.frames += 1;
        let decision = self.decide(detections);

        if let Some(chosen) = decision.chosen {
            self.controller.activate(chosen)?;
            self.telemetry.activations += 1;

            if !decision.suppressed.is_empty() {
                self.telemetry.suppressed += decision.suppressed.len() as u64;
                debug!("'{}' wins over {}", chosen, decision.suppressed);
                self.sink().emit(&AppEvent::Suppressed {
                    chosen,
                    dropped: decision.suppressed,
                });
            }
        }

        self.maybe_emit_telemetry();
        Ok(decision)
    }

    /// Pull one frame from `source` and handle it.
    pub fn process_frame(&mut self, source: &mut impl DetectionSource) -> Result<FrameOutcome> {
        match source.next_frame() {
            Ok(Some(detections)) => self
                .handle_detections(&detections)
                .map(FrameOutcome::Decision),
            Ok(None) => {
                info!("Detection feed exhausted after {} frames", self.telemetry.frames);
                Ok(FrameOutcome::Exhausted)
            }
            Err(e) => {
                warn!("Frame skipped: {}", e);
                self.telemetry.frames += 1;
                self.telemetry.skipped += 1;
                self.sink().emit(&AppEvent::FrameSkipped(e));
                self.maybe_emit_telemetry();
                Ok(FrameOutcome::Skipped(e))
            }
        }
    }

    /// Run the shutdown hook on the controller.
    pub fn shutdown(&self) {
        self.controller.shutdown();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn telemetry(&self) -> TelemetryData {
        self.telemetry
    }

    pub fn controller(&self) -> &ActuationController<H, S, T> {
        &self.controller
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn priority(&self) -> &PriorityOrder {
        &self.priority
    }

    fn sink(&self) -> &S {
        self.controller.bank().sink()
    }

    fn maybe_emit_telemetry(&self) {
        if self.telemetry.frames % self.telemetry_interval == 0 {
            self.sink().emit(&AppEvent::Telemetry(self.telemetry));
        }
    }
}
