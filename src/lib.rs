//! # BotWheel Teleop Library
//!
//! Drive a two-wheel ODrive robot base from keyboard, touch, gamepad and
//! tilt input.
//!
//! This library fuses every input source into one normalized drive command,
//! sends it to the robot only when it changes, and decodes the telemetry the
//! robot sends back (fault bitmasks, electrical and thermal readings, control
//! gains) for display and tuning.

pub mod arbiter;
pub mod config;
pub mod error;
pub mod gain;
pub mod input;
pub mod link;
pub mod protocol;
pub mod scheduler;
pub mod session;
pub mod telemetry;
pub mod transmitter;
