//! Actuator drivers over `embedded-hal` traits.

pub mod gate;
pub mod indicator;
