//! Integration tests for the frame pipeline: detect → classify → resolve →
//! activate, fed by a scripted detection source.

use core::time::Duration;
use std::sync::Arc;

use smartbin::adapters::detection_feed::JsonLinesFeed;
use smartbin::app::controller::{ActuationController, ActuatorBank};
use smartbin::app::events::AppEvent;
use smartbin::app::service::{FrameOutcome, FramePipeline};
use smartbin::category::Category;
use smartbin::config::SystemConfig;
use smartbin::error::{DetectionError, Error};
use smartbin::registry::{ActuatorPhase, ActuatorRegistry};

use super::mock_hw::{CollectingSink, ManualCloseTimer, MockHardware, ScriptedFeed, det};

type Pipeline = FramePipeline<MockHardware, CollectingSink, ManualCloseTimer>;

fn make_pipeline(config: &SystemConfig) -> Pipeline {
    let bank = Arc::new(ActuatorBank::new(
        ActuatorRegistry::from_config(config),
        MockHardware::new(),
        CollectingSink::default(),
    ));
    let controller = ActuationController::new(bank, ManualCloseTimer::default(), config.hold());
    FramePipeline::new(config, controller)
}

fn phase(p: &Pipeline, category: Category) -> ActuatorPhase {
    p.controller().snapshot(category).unwrap().phase()
}

fn sink(p: &Pipeline) -> &CollectingSink {
    p.controller().bank().sink()
}

// ── Arbitration ───────────────────────────────────────────────

#[test]
fn highest_priority_category_wins() {
    let mut config = SystemConfig::default();
    config.priority.clear();
    for c in [Category::Bottle, Category::Book, Category::Organic] {
        config.priority.push(c).unwrap();
    }
    let mut p = make_pipeline(&config);

    let d = p
        .handle_detections(&[det("apple", 0.9), det("bottle", 0.9)])
        .unwrap();
    assert_eq!(d.chosen, Some(Category::Bottle));
    assert_eq!(d.detected.len(), 2);
    assert_eq!(d.suppressed.iter().collect::<Vec<_>>(), vec![Category::Organic]);

    assert_eq!(phase(&p, Category::Bottle), ActuatorPhase::Active);
    assert_eq!(phase(&p, Category::Organic), ActuatorPhase::Idle);
    assert_eq!(
        sink(&p).count(|e| matches!(e, AppEvent::Suppressed { .. })),
        1
    );
}

#[test]
fn at_most_one_activation_per_frame() {
    let mut p = make_pipeline(&SystemConfig::default());
    p.handle_detections(&[
        det("book", 0.9),
        det("bottle", 0.9),
        det("banana", 0.9),
        det("apple", 0.9),
    ])
    .unwrap();

    let activated = sink(&p).count(|e| matches!(e, AppEvent::Activated { .. }));
    assert_eq!(activated, 1);
    assert_eq!(phase(&p, Category::Book), ActuatorPhase::Active);
    assert_eq!(p.telemetry().activations, 1);
}

#[test]
fn duplicate_detections_collapse() {
    let p = make_pipeline(&SystemConfig::default());
    let d = p.decide(&[det("apple", 0.9), det("banana", 0.8), det("orange", 0.7)]);
    assert_eq!(d.detected.len(), 1);
    assert_eq!(d.chosen, Some(Category::Organic));
    assert!(d.suppressed.is_empty());
    assert_eq!(d.annotations.len(), 3);
    assert_eq!(d.annotations[1].caption(), "banana 0.80");
}

#[test]
fn empty_and_unmapped_frames_change_nothing() {
    let mut p = make_pipeline(&SystemConfig::default());
    let d = p.handle_detections(&[]).unwrap();
    assert_eq!(d.chosen, None);
    let d = p.handle_detections(&[det("person", 0.99)]).unwrap();
    assert_eq!(d.chosen, None);
    assert!(d.annotations.is_empty());

    for c in Category::ALL {
        assert_eq!(phase(&p, c), ActuatorPhase::Idle);
    }
    assert!(p.controller().bank().hardware().calls().is_empty());
}

#[test]
fn low_confidence_detections_are_ignored() {
    let mut p = make_pipeline(&SystemConfig::default());
    let d = p
        .handle_detections(&[det("book", 0.49), det("bottle", 0.5)])
        .unwrap();
    assert_eq!(d.chosen, Some(Category::Bottle));
    assert!(!d.detected.contains(Category::Book));
}

// ── Feed handling ─────────────────────────────────────────────

#[test]
fn feed_errors_skip_the_frame() {
    let mut p = make_pipeline(&SystemConfig::default());
    let mut feed = ScriptedFeed::new([
        Err(DetectionError::Io),
        Ok(vec![det("bottle", 0.9)]),
        Err(DetectionError::Malformed),
    ]);

    assert_eq!(
        p.process_frame(&mut feed).unwrap(),
        FrameOutcome::Skipped(DetectionError::Io)
    );
    for c in Category::ALL {
        assert_eq!(phase(&p, c), ActuatorPhase::Idle);
    }

    assert!(matches!(
        p.process_frame(&mut feed).unwrap(),
        FrameOutcome::Decision(d) if d.chosen == Some(Category::Bottle)
    ));
    assert_eq!(
        p.process_frame(&mut feed).unwrap(),
        FrameOutcome::Skipped(DetectionError::Malformed)
    );
    assert_eq!(p.process_frame(&mut feed).unwrap(), FrameOutcome::Exhausted);

    let t = p.telemetry();
    assert_eq!(t.frames, 3);
    assert_eq!(t.skipped, 2);
    assert_eq!(
        sink(&p).count(|e| matches!(e, AppEvent::FrameSkipped(_))),
        2
    );
}

#[test]
fn json_lines_feed_drives_the_pipeline() {
    let input = concat!(
        "[{\"label\":\"book\",\"confidence\":0.8,\"box\":[1,2,3,4]}]\n",
        "garbage\n",
        "\n",
        "[{\"label\":\"apple\",\"confidence\":0.9,\"box\":[0,0,9,9]}]\n",
    );
    let mut feed = JsonLinesFeed::new(input.as_bytes());
    let mut p = make_pipeline(&SystemConfig::default());

    let mut outcomes = Vec::new();
    loop {
        match p.process_frame(&mut feed).unwrap() {
            FrameOutcome::Exhausted => break,
            other => outcomes.push(other),
        }
    }
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[1], FrameOutcome::Skipped(DetectionError::Malformed));
    assert_eq!(phase(&p, Category::Book), ActuatorPhase::Active);
    assert_eq!(phase(&p, Category::Organic), ActuatorPhase::Active);
}

// ── Timing through the pipeline ───────────────────────────────

#[test]
fn steady_detection_keeps_gate_open() {
    let mut p = make_pipeline(&SystemConfig::default());
    for second in 0..20u64 {
        p.controller()
            .timer()
            .advance_to(Duration::from_secs(second), &**p.controller().bank());
        p.handle_detections(&[det("bottle", 0.9)]).unwrap();
        assert_eq!(phase(&p, Category::Bottle), ActuatorPhase::Active);
    }

    // Detections stop at t = 19; the last hold ends at 29.
    p.controller()
        .timer()
        .advance_to(Duration::from_secs(28), &**p.controller().bank());
    assert_eq!(phase(&p, Category::Bottle), ActuatorPhase::Active);
    p.controller()
        .timer()
        .advance_to(Duration::from_secs(29), &**p.controller().bank());
    assert_eq!(phase(&p, Category::Bottle), ActuatorPhase::Idle);
}

// ── Fatal errors ──────────────────────────────────────────────

#[test]
fn category_without_actuator_is_fatal() {
    let mut config = SystemConfig::default();
    config.actuators.retain(|a| a.category != Category::Organic);
    let mut p = make_pipeline(&config);

    assert_eq!(
        p.handle_detections(&[det("apple", 0.9)]),
        Err(Error::UnknownCategory(Category::Organic))
    );
    let mut feed = ScriptedFeed::new([Ok(vec![det("fruit", 0.9)])]);
    assert_eq!(
        p.process_frame(&mut feed),
        Err(Error::UnknownCategory(Category::Organic))
    );
}

#[test]
fn shutdown_closes_open_gates() {
    let mut p = make_pipeline(&SystemConfig::default());
    p.handle_detections(&[det("book", 0.9)]).unwrap();
    p.shutdown();
    assert_eq!(phase(&p, Category::Book), ActuatorPhase::Idle);
    assert!(!p.controller().bank().hardware().indicator_on(Category::Book));
    assert_eq!(
        p.handle_detections(&[det("book", 0.9)]),
        Err(Error::ShutDown)
    );
}

#[test]
fn frame_after_interrupt_hook_is_refused() {
    let mut p = make_pipeline(&SystemConfig::default());
    p.controller().bank().force_close_all();

    assert_eq!(
        p.handle_detections(&[det("book", 0.9)]),
        Err(Error::ShutDown)
    );
    assert_eq!(phase(&p, Category::Book), ActuatorPhase::Idle);
    assert!(!p.controller().bank().hardware().indicator_on(Category::Book));
}
