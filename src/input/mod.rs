//! # Input Module
//!
//! Operator input sources and their adapters.
//!
//! Each adapter owns its own state (pointer tracks, held keys, connected
//! joysticks, orientation zero point) and turns it into an independent
//! [`InputSample`]. Adapters never see each other's state; combining them is
//! the job of the [`arbiter`](crate::arbiter).
//!
//! This module handles:
//! - Pointer and multi-touch drags
//! - Keyboard arrow/WASD driving with a Shift speed boost
//! - Analog joysticks sampled by a poll task
//! - Tilt control relative to a captured orientation zero point
//! - One-shot actions: drive state requests and gain steps
//! - Reading all of the above from Linux evdev devices

pub mod actions;
pub mod curve;
pub mod device;
pub mod joystick;
pub mod keyboard;
pub mod orientation;
pub mod pointer;

use actions::Action;
use keyboard::KeyName;
use orientation::OrientationReading;
use pointer::PointerEvent;

/// Normalized contribution of one input source.
///
/// Both axes are in `[-1, 1]`: `vel` positive is forward, `yaw` positive
/// turns right.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSample {
    pub vel: f64,
    pub yaw: f64,
}

impl InputSample {
    /// A sample that contributes nothing.
    pub const ZERO: InputSample = InputSample { vel: 0.0, yaw: 0.0 };

    #[must_use]
    pub fn new(vel: f64, yaw: f64) -> Self {
        Self { vel, yaw }
    }

    /// Clamps both axes to `[-1, 1]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            vel: clamp_unit(self.vel),
            yaw: clamp_unit(self.yaw),
        }
    }
}

/// Clamps a value to `[-1, 1]`. NaN collapses to 0.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Identifier of a connected joystick.
pub type JoystickId = usize;

/// A discrete input event delivered to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer / touch press, move, release or cancel
    Pointer(PointerEvent),

    /// Keyboard key transition
    Key { key: KeyName, pressed: bool },

    /// A joystick became available
    JoystickConnected { id: JoystickId },

    /// A joystick went away
    JoystickDisconnected { id: JoystickId },

    /// Latest normalized axis values of a joystick. Only stored; the poll
    /// task samples them on the next tick.
    JoystickAxes { id: JoystickId, vel: f64, yaw: f64 },

    /// Device orientation reading in degrees
    Orientation(OrientationReading),

    /// Tilt hold control pressed or released
    TiltHold { pressed: bool },

    /// Answer to an orientation sensor permission request
    OrientationPermission { granted: bool },

    /// Key or button bound to a one-shot action was pressed
    Action(Action),
}
