//! Application core: domain logic behind port traits.
//!
//! The frame pipeline and actuation controller live here.  All
//! interaction with hardware, the detector and the clock happens through
//! the **port traits** defined in [`ports`], keeping this layer testable
//! without real peripherals.

pub mod controller;
pub mod events;
pub mod ports;
pub mod service;
