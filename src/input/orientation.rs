//! # Orientation (Tilt) Adapter
//!
//! While the hold control is pressed, tilting the handheld device drives the
//! robot relative to the orientation it had when the hold started.
//!
//! ## Angles
//!
//! Readings follow the W3C device orientation convention, in degrees:
//! `alpha` (compass heading, 0..360), `beta` (front/back tilt), `gamma`
//! (left/right roll).
//!
//! | Delta | Output |
//! |---|---|
//! | `beta - zero.beta` (tilt) | `vel = clamp(-dTilt / 20)` |
//! | `gamma - zero.gamma` (roll) | `yaw = clamp(dRoll / 30)` |
//!
//! The yaw delta is wrapped into `[-180, 180)` so crossing the 0°/360° seam
//! does not jump. It is tracked but does not drive an output.

use tracing::{debug, info};

use super::{clamp_unit, InputSample};

/// Degrees of forward/back tilt for full velocity.
pub const TILT_FULL_SCALE_DEG: f64 = 20.0;

/// Degrees of roll for full yaw.
pub const ROLL_FULL_SCALE_DEG: f64 = 30.0;

/// One orientation reading in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationReading {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl OrientationReading {
    #[must_use]
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }
}

/// Change of orientation relative to the zero point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationDelta {
    pub yaw: f64,
    pub tilt: f64,
    pub roll: f64,
}

/// Sensor permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Never asked.
    #[default]
    Unknown,
    /// Asked, waiting for an answer.
    Requested,
    Granted,
    Denied,
}

/// Wraps an angle difference into `[-180, 180)`.
#[must_use]
pub fn wrap180(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Tilt control state: permission, hold control, latest reading and zero.
#[derive(Debug, Clone, Default)]
pub struct OrientationAdapter {
    permission: Permission,
    held: bool,
    latest: Option<OrientationReading>,
    zero: Option<OrientationReading>,
}

impl OrientationAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// `true` when the status indicator should offer to ask again.
    #[must_use]
    pub fn needs_permission(&self) -> bool {
        matches!(self.permission, Permission::Unknown | Permission::Denied)
    }

    /// Marks a (re-)request as in flight. Returns `false` if already granted.
    pub fn request_permission(&mut self) -> bool {
        if self.permission == Permission::Granted {
            return false;
        }
        self.permission = Permission::Requested;
        true
    }

    /// Records the host's answer to a permission request.
    pub fn set_permission(&mut self, granted: bool) {
        self.permission = if granted {
            Permission::Granted
        } else {
            Permission::Denied
        };
        info!("Orientation permission {:?}", self.permission);
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Presses or releases the hold control.
    ///
    /// A released-to-pressed transition recaptures the zero point from the
    /// latest reading (or from the next one if none has arrived yet).
    pub fn set_hold(&mut self, pressed: bool) {
        if pressed && !self.held {
            self.zero = self.latest;
            debug!("Tilt hold pressed, zero point {:?}", self.zero);
        } else if !pressed {
            self.zero = None;
        }
        self.held = pressed;
    }

    /// Stores a new reading.
    pub fn update(&mut self, reading: OrientationReading) {
        self.latest = Some(reading);
        if self.held && self.zero.is_none() {
            self.zero = Some(reading);
        }
    }

    /// Delta between the latest reading and the zero point, if active.
    #[must_use]
    pub fn delta(&self) -> Option<OrientationDelta> {
        if !self.held || self.permission != Permission::Granted {
            return None;
        }
        let (latest, zero) = (self.latest?, self.zero?);
        Some(OrientationDelta {
            yaw: wrap180(latest.alpha - zero.alpha),
            tilt: latest.beta - zero.beta,
            roll: latest.gamma - zero.gamma,
        })
    }

    /// Current tilt contribution; zero unless held with permission.
    #[must_use]
    pub fn sample(&self) -> InputSample {
        match self.delta() {
            Some(delta) => InputSample::new(
                clamp_unit(-delta.tilt / TILT_FULL_SCALE_DEG),
                clamp_unit(delta.roll / ROLL_FULL_SCALE_DEG),
            ),
            None => InputSample::ZERO,
        }
    }
}
