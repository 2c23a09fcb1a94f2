//! # Analog Joystick Adapter
//!
//! Gamepad sticks are continuous sources: their axis values are stored as
//! they arrive and sampled on each poll tick, rather than driving an update
//! per event.
//!
//! ## Poll Task
//!
//! [`PollTask`] is the arm/disarm state of the sampling loop:
//!
//! 1. The first connection arms it.
//! 2. Every tick while at least one joystick is connected yields
//!    [`PollOutcome::Sample`].
//! 3. The first tick after the last joystick went away yields
//!    [`PollOutcome::Final`] (one more update, now with a zero contribution)
//!    and disarms.
//! 4. Disarmed ticks yield [`PollOutcome::Idle`] until a new connection
//!    re-arms the task.

use std::collections::BTreeMap;

use tracing::debug;

use super::{clamp_unit, InputSample, JoystickId};

/// Result of a poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Task is disarmed; nothing to do.
    Idle,
    /// Joysticks are connected; sample and arbitrate.
    Sample,
    /// Last joystick gone; arbitrate once more and stop.
    Final,
}

/// Arm/disarm state of the joystick sampling loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollTask {
    armed: bool,
}

impl PollTask {
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Arms the task. Returns `true` if it was disarmed before.
    pub fn arm(&mut self) -> bool {
        !std::mem::replace(&mut self.armed, true)
    }

    /// Advances one tick given the number of connected joysticks.
    pub fn tick(&mut self, connected: usize) -> PollOutcome {
        match (self.armed, connected) {
            (false, _) => PollOutcome::Idle,
            (true, 0) => {
                self.armed = false;
                PollOutcome::Final
            }
            (true, _) => PollOutcome::Sample,
        }
    }
}

/// Latest axis values of one connected joystick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct StickAxes {
    vel: f64,
    yaw: f64,
}

/// Connected joysticks and their poll task.
#[derive(Debug, Clone, Default)]
pub struct JoystickAdapter {
    sticks: BTreeMap<JoystickId, StickAxes>,
    poll: PollTask,
}

impl JoystickAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a joystick and arms the poll task.
    pub fn connect(&mut self, id: JoystickId) {
        self.sticks.entry(id).or_default();
        if self.poll.arm() {
            debug!("Joystick {} connected, poll task armed", id);
        }
    }

    /// Forgets a joystick. Its contribution drops to zero immediately; the
    /// poll task disarms on its next tick if none remain.
    pub fn disconnect(&mut self, id: JoystickId) {
        if self.sticks.remove(&id).is_some() {
            debug!("Joystick {} disconnected", id);
        }
    }

    /// Stores the latest axis values of a connected joystick.
    ///
    /// Values for unknown joysticks are ignored.
    pub fn update_axes(&mut self, id: JoystickId, vel: f64, yaw: f64) {
        if let Some(axes) = self.sticks.get_mut(&id) {
            *axes = StickAxes { vel, yaw };
        }
    }

    #[must_use]
    pub fn connected(&self) -> usize {
        self.sticks.len()
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poll.is_armed()
    }

    /// Advances the poll task.
    pub fn poll(&mut self) -> PollOutcome {
        let outcome = self.poll.tick(self.sticks.len());
        if outcome == PollOutcome::Final {
            debug!("No joysticks left, poll task disarmed");
        }
        outcome
    }

    /// Current contribution of all connected joysticks.
    #[must_use]
    pub fn sample(&self) -> InputSample {
        let (vel, yaw) = self
            .sticks
            .values()
            .fold((0.0, 0.0), |(vel, yaw), axes| (vel + axes.vel, yaw + axes.yaw));
        InputSample::new(clamp_unit(vel), clamp_unit(yaw))
    }
}
