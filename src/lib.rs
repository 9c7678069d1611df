//! SmartBin controller library.
//!
//! Turns per-frame object detections into at most one actuation per
//! frame: classify labels into bin categories, pick the highest-priority
//! category, light its indicator and open its gate for a hold interval.
//! Exposed as a library for the binary, integration tests and external
//! inspection.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod category;
pub mod classify;
pub mod close_timer;
pub mod config;
pub mod detection;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod priority;
pub mod registry;
