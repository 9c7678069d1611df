//! System configuration parameters
//!
//! All tunable parameters for the SmartBin controller.  Static: provided
//! at startup (defaults or a JSON file) and never re-read at runtime.

use core::fmt;
use core::time::Duration;
use std::path::Path;

use heapless::{String, Vec};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategorySet};
use crate::pins;

/// Longest detection label the table accepts.
pub const MAX_LABEL_LEN: usize = 32;
/// Maximum number of label → category rules.
pub const MAX_LABELS: usize = 32;

/// One row of the label table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRule {
    pub label: String<MAX_LABEL_LEN>,
    pub category: Category,
}

/// Wiring and duty settings for one category's indicator + gate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    pub category: Category,
    /// BCM GPIO driving the indicator LED.
    pub indicator_gpio: u8,
    /// BCM GPIO carrying the gate servo PWM.
    pub gate_gpio: u8,
    /// Gate duty (percent of PWM period) when open.
    pub open_duty_percent: f32,
    /// Gate duty (percent of PWM period) when closed.
    pub closed_duty_percent: f32,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Decision ---
    /// Detection label → category table.
    pub labels: Vec<LabelRule, MAX_LABELS>,
    /// Arbitration order, highest priority first.
    pub priority: Vec<Category, { Category::COUNT }>,
    /// Detections below this confidence are ignored.
    pub min_confidence: f32,

    // --- Actuation ---
    pub actuators: Vec<ActuatorConfig, { Category::COUNT }>,
    /// How long a gate stays open after its last activation (milliseconds).
    pub hold_ms: u32,

    // --- Timing ---
    /// Minimum spacing between frames (milliseconds, 0 = unpaced).
    pub frame_interval_ms: u32,
    /// Telemetry report interval (frames).
    pub telemetry_interval_frames: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut labels = Vec::new();
        for (label, category) in [
            ("bottle", Category::Bottle),
            ("book", Category::Book),
            ("banana", Category::Organic),
            ("apple", Category::Organic),
            ("orange", Category::Organic),
            ("vegetable", Category::Organic),
            ("fruit", Category::Organic),
            ("leftover food", Category::Organic),
        ] {
            let _ = labels.push(LabelRule {
                label: String::try_from(label).unwrap_or_default(),
                category,
            });
        }

        let mut priority = Vec::new();
        for c in [Category::Book, Category::Bottle, Category::Organic] {
            let _ = priority.push(c);
        }

        let mut actuators = Vec::new();
        for (category, indicator_gpio, gate_gpio) in [
            (Category::Bottle, pins::BOTTLE_LED_GPIO, pins::BOTTLE_SERVO_GPIO),
            (Category::Book, pins::BOOK_LED_GPIO, pins::BOOK_SERVO_GPIO),
            (Category::Organic, pins::ORGANIC_LED_GPIO, pins::ORGANIC_SERVO_GPIO),
        ] {
            let _ = actuators.push(ActuatorConfig {
                category,
                indicator_gpio,
                gate_gpio,
                open_duty_percent: pins::SERVO_OPEN_DUTY_PERCENT,
                closed_duty_percent: pins::SERVO_CLOSED_DUTY_PERCENT,
            });
        }

        Self {
            labels,
            priority,
            min_confidence: 0.5,
            actuators,
            hold_ms: 10_000, // 10 s
            frame_interval_ms: 33, // ~30 fps
            telemetry_interval_frames: 300,
        }
    }
}

impl SystemConfig {
    /// Hold duration as a [`Duration`].
    pub fn hold(&self) -> Duration {
        Duration::from_millis(u64::from(self.hold_ms))
    }

    /// Actuator settings for `category`, if one is configured.
    pub fn actuator(&self, category: Category) -> Option<&ActuatorConfig> {
        self.actuators.iter().find(|a| a.category == category)
    }

    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            warn!("config: parse failed: {}", e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        Self::from_json_str(&json)
    }

    /// Range and consistency checks.  Invalid values are rejected, never
    /// clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hold_ms == 0 {
            return Err(ConfigError::ValidationFailed("hold_ms must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::ValidationFailed(
                "min_confidence must be within 0.0..=1.0",
            ));
        }
        if self.telemetry_interval_frames == 0 {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_frames must be > 0",
            ));
        }

        // Priority order: a permutation of every category.
        let seen: CategorySet = self.priority.iter().copied().collect();
        if seen.len() != self.priority.len() || self.priority.len() != Category::COUNT {
            return Err(ConfigError::ValidationFailed(
                "priority must list every category exactly once",
            ));
        }

        // Actuators: unique, one for every prioritised category.
        let wired: CategorySet = self.actuators.iter().map(|a| a.category).collect();
        if wired.len() != self.actuators.len() {
            return Err(ConfigError::ValidationFailed("duplicate actuator category"));
        }
        if self.priority.iter().any(|c| !wired.contains(*c)) {
            return Err(ConfigError::ValidationFailed(
                "every category in the priority order needs an actuator",
            ));
        }
        for a in &self.actuators {
            let in_range = |d: f32| (0.0..=100.0).contains(&d);
            if !in_range(a.open_duty_percent) || !in_range(a.closed_duty_percent) {
                return Err(ConfigError::ValidationFailed(
                    "gate duty must be within 0..=100 percent",
                ));
            }
        }

        // Labels: non-empty, unique.
        for (i, rule) in self.labels.iter().enumerate() {
            if rule.label.is_empty() {
                return Err(ConfigError::ValidationFailed("empty label"));
            }
            if self.labels[..i].iter().any(|r| r.label == rule.label) {
                return Err(ConfigError::ValidationFailed("label listed twice"));
            }
        }
        let labelled: CategorySet = self.labels.iter().map(|r| r.category).collect();
        for c in Category::ALL {
            if !labelled.contains(c) {
                warn!("config: no label maps to category '{}'", c);
            }
        }

        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading or validating a [`SystemConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file does not exist.
    NotFound,
    /// Config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error reading the file.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
