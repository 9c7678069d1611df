//! Integration tests for the actuation controller: timed hold, stale-close
//! suppression, shutdown and fault reporting, driven through mock adapters
//! on a virtual clock.

use core::time::Duration;
use std::sync::Arc;

use smartbin::app::controller::{ActuationController, ActuatorBank};
use smartbin::app::events::AppEvent;
use smartbin::app::ports::{CloseTarget, CloseTimer};
use smartbin::category::Category;
use smartbin::close_timer::ExecutorCloseTimer;
use smartbin::config::SystemConfig;
use smartbin::error::{ActuatorError, Error};
use smartbin::registry::{ActuatorPhase, ActuatorRegistry, GateDuty};

use super::mock_hw::{CollectingSink, ManualCloseTimer, MockHardware};

type Controller = ActuationController<MockHardware, CollectingSink, ManualCloseTimer>;

const HOLD: Duration = Duration::from_secs(10);

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn make_controller() -> Controller {
    let config = SystemConfig::default();
    let bank = Arc::new(ActuatorBank::new(
        ActuatorRegistry::from_config(&config),
        MockHardware::new(),
        CollectingSink::default(),
    ));
    ActuationController::new(bank, ManualCloseTimer::default(), HOLD)
}

fn phase(ctl: &Controller, category: Category) -> ActuatorPhase {
    ctl.snapshot(category).unwrap().phase()
}

fn advance(ctl: &Controller, t: Duration) -> Vec<bool> {
    ctl.timer().advance_to(t, &**ctl.bank())
}

// ── Timed hold ────────────────────────────────────────────────

#[test]
fn gate_opens_then_closes_after_hold() {
    let ctl = make_controller();
    ctl.activate(Category::Bottle).unwrap();

    let hw = ctl.bank().hardware();
    assert!(hw.indicator_on(Category::Bottle));
    assert_eq!(hw.gate_duty(Category::Bottle), Some(7.5));

    assert!(advance(&ctl, secs(9)).is_empty());
    assert_eq!(phase(&ctl, Category::Bottle), ActuatorPhase::Active);

    assert_eq!(advance(&ctl, secs(10)), vec![true]);
    assert_eq!(phase(&ctl, Category::Bottle), ActuatorPhase::Idle);
    assert!(!hw.indicator_on(Category::Bottle));
    assert_eq!(hw.gate_duty(Category::Bottle), Some(2.5));
}

#[test]
fn reactivation_extends_the_hold() {
    // H = 10: activate at 0 and 5 → still open at 10, closed at 15.
    let ctl = make_controller();
    ctl.activate(Category::Book).unwrap();
    advance(&ctl, secs(5));
    ctl.activate(Category::Book).unwrap();

    assert_eq!(advance(&ctl, secs(10)), vec![false], "first close is stale");
    assert_eq!(phase(&ctl, Category::Book), ActuatorPhase::Active);
    assert!(ctl.bank().hardware().indicator_on(Category::Book));

    assert_eq!(advance(&ctl, secs(15)), vec![true]);
    assert_eq!(phase(&ctl, Category::Book), ActuatorPhase::Idle);

    let sink = ctl.bank().sink();
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::StaleClose { generation: 1, .. })),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Closed { generation: 2, .. })),
        1
    );
}

#[test]
fn repeated_activation_is_idempotent() {
    let ctl = make_controller();
    for _ in 0..5 {
        ctl.activate(Category::Organic).unwrap();
    }
    let s = ctl.snapshot(Category::Organic).unwrap();
    assert_eq!(s.phase(), ActuatorPhase::Active);
    assert_eq!(s.generation, 5);
    assert!((s.gate_duty - 7.5).abs() < f32::EPSILON);

    // Four stale closes, one real one, all at t = 10.
    let fired = advance(&ctl, secs(10));
    assert_eq!(fired.iter().filter(|ok| **ok).count(), 1);
    assert_eq!(phase(&ctl, Category::Organic), ActuatorPhase::Idle);
}

// ── Isolation ─────────────────────────────────────────────────

#[test]
fn categories_do_not_interfere() {
    let ctl = make_controller();
    ctl.activate(Category::Bottle).unwrap();
    advance(&ctl, secs(4));
    ctl.activate(Category::Organic).unwrap();

    advance(&ctl, secs(10));
    assert_eq!(phase(&ctl, Category::Bottle), ActuatorPhase::Idle);
    assert_eq!(phase(&ctl, Category::Organic), ActuatorPhase::Active);
    assert_eq!(phase(&ctl, Category::Book), ActuatorPhase::Idle);
    assert_eq!(ctl.snapshot(Category::Book).unwrap().generation, 0);

    advance(&ctl, secs(14));
    assert_eq!(phase(&ctl, Category::Organic), ActuatorPhase::Idle);
}

#[test]
fn states_lists_every_registered_category() {
    let ctl = make_controller();
    ctl.activate(Category::Book).unwrap();
    let states: Vec<_> = ctl.states().map(|(c, s)| (c, s.phase())).collect();
    assert_eq!(
        states,
        vec![
            (Category::Bottle, ActuatorPhase::Idle),
            (Category::Book, ActuatorPhase::Active),
            (Category::Organic, ActuatorPhase::Idle),
        ]
    );
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_closes_everything_and_ignores_pending() {
    let ctl = make_controller();
    ctl.activate(Category::Bottle).unwrap();
    ctl.activate(Category::Book).unwrap();
    ctl.shutdown();

    for c in Category::ALL {
        assert_eq!(phase(&ctl, c), ActuatorPhase::Idle);
        assert!(!ctl.bank().hardware().indicator_on(c));
    }
    assert!(ctl.timer().is_stopped());
    assert_eq!(ctl.timer().pending(), 0);
    assert!(ctl.is_shut_down());
    assert_eq!(ctl.activate(Category::Bottle), Err(Error::ShutDown));

    // Idempotent: a second call emits nothing new.
    let before = ctl.bank().sink().events().len();
    ctl.shutdown();
    assert_eq!(ctl.bank().sink().events().len(), before);
}

#[test]
fn close_delivered_after_shutdown_is_stale() {
    let ctl = make_controller();
    let g = ctl.activate(Category::Book).unwrap();
    ctl.bank().force_close_all();

    assert!(!ctl.bank().expire(Category::Book, g));
    assert_eq!(phase(&ctl, Category::Book), ActuatorPhase::Idle);
}

#[test]
fn interrupt_hook_latches_shutdown_for_the_frame_loop() {
    let ctl = make_controller();
    ctl.activate(Category::Bottle).unwrap();

    // The Ctrl-C handler reaches the bank directly, not the controller.
    ctl.bank().force_close_all();

    assert!(ctl.is_shut_down());
    assert_eq!(ctl.activate(Category::Book), Err(Error::ShutDown));
    for c in Category::ALL {
        assert_eq!(phase(&ctl, c), ActuatorPhase::Idle);
        assert!(!ctl.bank().hardware().indicator_on(c));
    }
    assert_eq!(ctl.timer().pending(), 1);
    assert_eq!(
        ctl.bank()
            .sink()
            .count(|e| matches!(e, AppEvent::Activated { .. })),
        1
    );
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn hardware_failure_is_reported_not_fatal() {
    let ctl = make_controller();
    ctl.bank().hardware().fail_writes_for(Category::Bottle);

    let g = ctl.activate(Category::Bottle).unwrap();
    assert_eq!(g, 1);
    // Logical state records the attempted transition.
    assert_eq!(phase(&ctl, Category::Bottle), ActuatorPhase::Active);

    let faults = ctl.bank().sink().count(|e| {
        matches!(
            e,
            AppEvent::HardwareFault {
                category: Category::Bottle,
                error: ActuatorError::GpioWriteFailed,
            }
        )
    });
    assert_eq!(faults, 2, "indicator and gate writes both fail");

    assert_eq!(advance(&ctl, secs(10)), vec![true]);
    assert_eq!(phase(&ctl, Category::Bottle), ActuatorPhase::Idle);
}

#[test]
fn unregistered_category_is_rejected() {
    let config = SystemConfig::default();
    let registry = ActuatorRegistry::new(
        config
            .actuators
            .iter()
            .filter(|a| a.category != Category::Organic)
            .map(|a| {
                (
                    a.category,
                    GateDuty {
                        open: a.open_duty_percent,
                        closed: a.closed_duty_percent,
                    },
                )
            }),
    );
    let bank = Arc::new(ActuatorBank::new(
        registry,
        MockHardware::new(),
        CollectingSink::default(),
    ));
    let ctl = ActuationController::new(bank, ManualCloseTimer::default(), HOLD);

    assert_eq!(
        ctl.activate(Category::Organic),
        Err(Error::UnknownCategory(Category::Organic))
    );
    assert!(ctl.bank().hardware().calls().is_empty());
    assert_eq!(ctl.timer().pending(), 0);
}

// ── Real close-timer runtime ──────────────────────────────────

#[test]
fn executor_timer_closes_after_hold() {
    let config = SystemConfig::default();
    let bank = Arc::new(ActuatorBank::new(
        ActuatorRegistry::from_config(&config),
        MockHardware::new(),
        CollectingSink::default(),
    ));
    let timer = ExecutorCloseTimer::spawn(bank.clone()).unwrap();
    let ctl = ActuationController::new(bank, timer, Duration::from_millis(50));

    ctl.activate(Category::Bottle).unwrap();
    ctl.activate(Category::Bottle).unwrap();
    assert_eq!(phase_of(&ctl, Category::Bottle), ActuatorPhase::Active);

    std::thread::sleep(Duration::from_millis(500));
    assert_eq!(phase_of(&ctl, Category::Bottle), ActuatorPhase::Idle);

    let sink = ctl.bank().sink();
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Closed { .. })), 1);
    ctl.shutdown();
}

fn phase_of<T: CloseTimer>(
    ctl: &ActuationController<MockHardware, CollectingSink, T>,
    category: Category,
) -> ActuatorPhase {
    ctl.snapshot(category).unwrap().phase()
}
