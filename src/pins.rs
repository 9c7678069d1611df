//! GPIO / PWM pin assignments for the SmartBin main board.
//!
//! Single source of truth for the default wiring.  The default
//! [`SystemConfig`](crate::config::SystemConfig) references this module
//! rather than hard-coding pin numbers.  Numbers are BCM GPIO numbers on
//! the Raspberry Pi 40-pin header.

// ---------------------------------------------------------------------------
// Indicator LEDs (active HIGH)
// ---------------------------------------------------------------------------

pub const BOTTLE_LED_GPIO: u8 = 17;
pub const BOOK_LED_GPIO: u8 = 22;
pub const ORGANIC_LED_GPIO: u8 = 24;

// ---------------------------------------------------------------------------
// Gate servos (hobby servo, PWM)
// ---------------------------------------------------------------------------

pub const BOTTLE_SERVO_GPIO: u8 = 18;
pub const BOOK_SERVO_GPIO: u8 = 23;
pub const ORGANIC_SERVO_GPIO: u8 = 25;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Servo PWM frame rate (20 ms period).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Duty (percent of period) that swings the gate open (~1.5 ms pulse).
pub const SERVO_OPEN_DUTY_PERCENT: f32 = 7.5;
/// Duty (percent of period) that holds the gate closed (~0.5 ms pulse).
pub const SERVO_CLOSED_DUTY_PERCENT: f32 = 2.5;
