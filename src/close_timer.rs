//! Close-timer runtime: delayed, self-invalidating gate closes.
//!
//! Runs in a dedicated thread using `edge-executor` with one long-lived
//! task per category and `async-io-mini` reactor timers (no busy-spinning,
//! no thread per activation).  Arming is a non-blocking `Signal` write, so
//! the frame loop never waits on the timer thread.
//!
//! ```text
//!  ┌────────────────────────────────────────────────────────────┐
//!  │  close-timer thread                                        │
//!  │  ┌──────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                        │  │
//!  │  │                                                      │  │
//!  │  │  ┌──────────┐  ┌──────────┐  ┌──────────┐            │  │
//!  │  │  │ bottle ⏱ │  │  book ⏱  │  │ organic ⏱│            │  │
//!  │  │  └────▲─────┘  └────▲─────┘  └────▲─────┘            │  │
//!  │  └───────┼─────────────┼─────────────┼──────────────────┘  │
//!  └──────────┼─────────────┼─────────────┼─────────────────────┘
//!             └──── Signal<Arm> (latest generation wins) ───── arm()
//! ```
//!
//! A task holds at most one deadline.  Re-arming replaces it, which keeps
//! the pending-close count bounded by the number of categories however
//! fast activations arrive.  When a deadline passes the task calls
//! [`CloseTarget::expire`]; the generation check there decides whether the
//! close still applies.

use core::time::Duration;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Instant;

use async_io_mini::Timer;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use log::{info, warn};

use crate::app::ports::{CloseTarget, CloseTimer};
use crate::category::Category;

type ArmSignal = Signal<CriticalSectionRawMutex, Arm>;

/// A pending close: fire `generation` at `deadline`.
#[derive(Debug, Clone, Copy)]
struct Arm {
    generation: u64,
    deadline: Instant,
}

struct Shared {
    arms: [ArmSignal; Category::COUNT],
    stop: Signal<CriticalSectionRawMutex, ()>,
}

/// [`CloseTimer`] backed by the executor thread.
pub struct ExecutorCloseTimer {
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl ExecutorCloseTimer {
    /// Spawn the timer thread.  Expiries are delivered to `target`.
    pub fn spawn(target: Arc<dyn CloseTarget>) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            arms: core::array::from_fn(|_| Signal::new()),
            stop: Signal::new(),
        });

        let thread_shared = shared.clone();
        let thread = std::thread::Builder::new()
            .name("close-timer".into())
            .spawn(move || run_timer_loop(&thread_shared, target.as_ref()))?;

        Ok(Self {
            shared,
            thread: Mutex::new(Some(thread)),
        })
    }
}

impl CloseTimer for ExecutorCloseTimer {
    fn arm(&self, category: Category, generation: u64, hold: Duration) {
        self.shared.arms[category.index()].signal(Arm {
            generation,
            deadline: Instant::now() + hold,
        });
    }

    fn stop(&self) {
        self.shared.stop.signal(());
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("close-timer thread panicked");
            }
        }
    }
}

impl Drop for ExecutorCloseTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Executor thread ──────────────────────────────────────────

fn run_timer_loop(shared: &Shared, target: &dyn CloseTarget) {
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    for category in Category::ALL {
        executor
            .spawn(close_task(category, &shared.arms[category.index()], target))
            .detach();
    }

    info!("close-timer started ({} category tasks)", Category::COUNT);
    future::block_on(executor.run(shared.stop.wait()));
    info!("close-timer stopped");
}

/// One category's close loop: wait for an arm, sleep until its deadline
/// unless re-armed first, then expire.
async fn close_task(category: Category, arm: &ArmSignal, target: &dyn CloseTarget) {
    let mut pending = arm.wait().await;
    loop {
        let rearmed = future::or(
            async {
                Timer::at(pending.deadline).await;
                None
            },
            async { Some(arm.wait().await) },
        )
        .await;

        match rearmed {
            Some(next) => pending = next,
            None => {
                target.expire(category, pending.generation);
                pending = arm.wait().await;
            }
        }
    }
}
