//! SmartBin controller: main entry point.
//!
//! Hexagonal architecture: the frame loop and the close-timer runtime meet
//! only at the shared actuator bank.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  JsonLinesFeed      HardwareAdapter<SimPin, SimPwm>            │
//! │  (DetectionSource)  (ActuatorPort)       LogEventSink          │
//! │                                          (EventSink)           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  FramePipeline (classify · resolve)                    │    │
//! │  │  ActuationController ──▶ ActuatorBank ◀── close timer  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use smartbin::adapters::detection_feed::JsonLinesFeed;
use smartbin::adapters::log_sink::LogEventSink;
use smartbin::adapters::sim;
use smartbin::app::controller::{ActuationController, ActuatorBank};
use smartbin::app::service::{FrameOutcome, FramePipeline};
use smartbin::close_timer::ExecutorCloseTimer;
use smartbin::config::SystemConfig;
use smartbin::error::Error;
use smartbin::registry::ActuatorRegistry;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Route detected waste to the right bin: light its indicator and open its gate"
)]
struct Args {
    /// JSON config file.  Built-in defaults are used when omitted.
    #[arg(long, env = "SMARTBIN_CONFIG")]
    config: Option<PathBuf>,

    /// JSON-lines detection feed (one frame per line).  Reads stdin when omitted.
    #[arg(long, env = "SMARTBIN_DETECTIONS")]
    detections: Option<PathBuf>,

    /// Override the configured frame spacing (milliseconds, 0 = unpaced).
    #[arg(long)]
    frame_interval_ms: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartBin v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1. Configuration ──────────────────────────────────────
    let mut config = match &args.config {
        Some(path) => SystemConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            info!("No config file given, using defaults");
            SystemConfig::default()
        }
    };
    if let Some(ms) = args.frame_interval_ms {
        config.frame_interval_ms = ms;
    }
    config.validate().context("invalid configuration")?;
    info!(
        "Config: {} labels, priority {:?}, hold {:?}",
        config.labels.len(),
        config.priority.as_slice(),
        config.hold()
    );

    // ── 2. Adapters + actuator bank ───────────────────────────
    let hw = sim::simulated(&config);
    let registry = ActuatorRegistry::from_config(&config);
    let bank = Arc::new(ActuatorBank::new(registry, hw, LogEventSink::new()));
    bank.sync_outputs();

    // ── 3. Close-timer runtime + controller ───────────────────
    let timer = ExecutorCloseTimer::spawn(bank.clone()).context("starting close-timer thread")?;
    let controller = ActuationController::new(bank.clone(), timer, config.hold());
    let mut pipeline = FramePipeline::new(&config, controller);

    // ── 4. Shutdown hook on Ctrl-C ────────────────────────────
    // The frame loop may be blocked reading the feed, so the handler
    // closes the gates itself.  A second Ctrl-C exits immediately.
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        let bank = bank.clone();
        ctrlc::set_handler(move || {
            if stop.swap(true, Ordering::SeqCst) {
                std::process::exit(130);
            }
            warn!("Interrupt received, closing all gates");
            bank.force_close_all();
        })
        .context("installing Ctrl-C handler")?;
    }

    // ── 5. Frame loop ─────────────────────────────────────────
    let reader: Box<dyn BufRead> = match &args.detections {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut feed = JsonLinesFeed::new(reader);
    let frame_interval = Duration::from_millis(u64::from(config.frame_interval_ms));

    info!("System ready. Entering frame loop.");

    let result = loop {
        if stop.load(Ordering::SeqCst) {
            break Ok(());
        }
        let started = Instant::now();

        match pipeline.process_frame(&mut feed) {
            Ok(FrameOutcome::Exhausted) => break Ok(()),
            Ok(_) => {}
            // The Ctrl-C hook latched shutdown while this frame was in flight.
            Err(Error::ShutDown) if stop.load(Ordering::SeqCst) => break Ok(()),
            Err(e) => {
                error!("Fatal: {}", e);
                break Err(e);
            }
        }

        if let Some(rest) = frame_interval.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    };

    // ── 6. Shutdown ───────────────────────────────────────────
    pipeline.shutdown();
    let telemetry = pipeline.telemetry();
    info!(
        "Stopped after {} frames ({} skipped, {} activations)",
        telemetry.frames, telemetry.skipped, telemetry.activations
    );

    result.context("frame pipeline aborted")
}
