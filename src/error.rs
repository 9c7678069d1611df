//! Unified error types for the SmartBin controller.
//!
//! `Error` covers the failures that stop the frame loop.  Hardware and
//! detection-feed failures have their own enums: they are reported as
//! events and never stop the loop.  All variants are `Copy` so they can
//! be passed through the controller and pipeline without allocation.

use core::fmt;

use crate::category::Category;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Failures of the actuation controller.  Both are fatal to the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `activate` was asked for a category with no registered actuator.
    /// Indicates a mismatch between priority order and registry; fatal.
    UnknownCategory(Category),
    /// `activate` was called after the shutdown hook ran.
    ShutDown,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCategory(c) => write!(f, "unknown category: {c}"),
            Self::ShutDown => write!(f, "controller is shut down"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// GPIO set failed.
    GpioWriteFailed,
    /// The hardware adapter has no channel wired for this category.
    NotWired,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::NotWired => write!(f, "no channel wired"),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection feed errors
// ---------------------------------------------------------------------------

/// Failures of the detection collaborator.  None of these escape the
/// frame loop: the pipeline skips the frame and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionError {
    /// The frame payload could not be decoded.
    Malformed,
    /// The underlying reader failed.
    Io,
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed frame"),
            Self::Io => write!(f, "feed I/O error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
