//! # Command Arbiter
//!
//! Combines the samples of all input sources into one [`Command`].
//!
//! Saturation happens twice: every source is clamped to `[-1, 1]` on its
//! own, then the sum is clamped again before scaling to physical units. A
//! single full-deflection source therefore drives exactly as fast as several
//! of them at once.
//!
//! ```
//! use botwheel_teleop::arbiter::{arbitrate, MAX_VEL, MAX_YAW};
//! use botwheel_teleop::input::InputSample;
//!
//! let command = arbitrate(&[InputSample::new(0.8, 0.0), InputSample::new(0.8, -0.5)], None);
//! assert_eq!(command.vel, MAX_VEL);
//! assert_eq!(command.yaw, -0.5 * MAX_YAW);
//! ```

use crate::input::{clamp_unit, InputSample};
use crate::protocol::frames::{Command, StateRequest};

/// Linear speed at full deflection [m/s].
pub const MAX_VEL: f64 = 1.0;

/// Yaw rate at full deflection [turns/s].
pub const MAX_YAW: f64 = 0.5;

/// Sums, saturates and scales source samples into a command.
///
/// A state request is attached unmodified.
#[must_use]
pub fn arbitrate(samples: &[InputSample], state: Option<StateRequest>) -> Command {
    let (vel, yaw) = samples
        .iter()
        .map(|sample| sample.clamped())
        .fold((0.0, 0.0), |(vel, yaw), sample| (vel + sample.vel, yaw + sample.yaw));

    Command {
        vel: MAX_VEL * clamp_unit(vel),
        yaw: MAX_YAW * clamp_unit(yaw),
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_samples_is_stop() {
        assert_eq!(arbitrate(&[], None), Command::new(0.0, 0.0, None));
    }

    #[test]
    fn test_single_source_scaled() {
        let command = arbitrate(&[InputSample::new(0.5, -0.5)], None);
        assert_eq!(command.vel, 0.5 * MAX_VEL);
        assert_eq!(command.yaw, -0.5 * MAX_YAW);
    }

    #[test]
    fn test_sum_within_range_is_exact() {
        let samples = [
            InputSample::new(0.25, 0.5),
            InputSample::new(0.5, -0.25),
            InputSample::new(-0.25, 0.0),
        ];
        let command = arbitrate(&samples, None);
        assert_eq!(command.vel, MAX_VEL * 0.5);
        assert_eq!(command.yaw, MAX_YAW * 0.25);
    }

    #[test]
    fn test_saturation_is_exact_at_boundary() {
        let samples = [InputSample::new(1.0, -1.0), InputSample::new(1.0, -1.0)];
        let command = arbitrate(&samples, None);
        assert_eq!(command.vel, MAX_VEL);
        assert_eq!(command.yaw, -MAX_YAW);
    }

    #[test]
    fn test_all_sources_full_deflection_match_one() {
        let one = arbitrate(&[InputSample::new(1.0, 1.0)], None);
        let four = arbitrate(&[InputSample::new(1.0, 1.0); 4], None);
        assert_eq!(one, four);
    }

    #[test]
    fn test_per_source_clamp_before_sum() {
        // An out-of-range source cannot overpower an opposing one
        let samples = [InputSample::new(5.0, 0.0), InputSample::new(-1.0, 0.0)];
        assert_eq!(arbitrate(&samples, None).vel, 0.0);
    }

    #[test]
    fn test_state_request_attached() {
        let command = arbitrate(&[InputSample::ZERO], Some(StateRequest::Drive));
        assert_eq!(command.state, Some(StateRequest::Drive));
        assert_eq!(command.vel, 0.0);
    }

    #[test]
    fn test_nan_sample_contributes_nothing() {
        let samples = [InputSample::new(f64::NAN, 0.5)];
        let command = arbitrate(&samples, None);
        assert_eq!(command.vel, 0.0);
        assert_eq!(command.yaw, 0.5 * MAX_YAW);
    }
}
