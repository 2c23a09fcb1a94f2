//! # Response Curves
//!
//! Shaping helpers shared by the input adapters.
//!
//! ## Drag Response
//!
//! Pointer drags use `f(y) = 0.4·y + 0.6·y·|y|`: mostly linear near the
//! center for fine control, quadratic further out. `f(±1) = ±1` so full
//! deflection is preserved.
//!
//! ## Raw Axis Normalization
//!
//! evdev reports joystick axes as raw integers (`0..=255` on most pads).
//! [`AxisNormalizer`] maps them to `[-1, 1]` around the range center and
//! applies a deadzone that removes stick drift while still reaching full
//! deflection at the endpoints.
//!
//! ```
//! use botwheel_teleop::input::curve::{drag_response, AxisNormalizer};
//!
//! assert_eq!(drag_response(1.0), 1.0);
//! assert_eq!(drag_response(0.0), 0.0);
//!
//! let axis = AxisNormalizer::new(0, 255, 0.05);
//! assert!((axis.normalize(255) - 1.0).abs() < 1e-9);
//! ```

use super::clamp_unit;

/// Linear share of the drag response curve.
const LINEAR_WEIGHT: f64 = 0.4;

/// Quadratic share of the drag response curve.
const QUADRATIC_WEIGHT: f64 = 0.6;

/// Applies the drag response curve to a value already in `[-1, 1]`.
#[must_use]
pub fn drag_response(y: f64) -> f64 {
    LINEAR_WEIGHT * y + QUADRATIC_WEIGHT * y * y.abs()
}

/// Maps a raw evdev axis range onto `[-1, 1]` with a deadzone.
#[derive(Debug, Clone, Copy)]
pub struct AxisNormalizer {
    min: i32,
    max: i32,
    /// Deadzone as a fraction (0.0 to 0.25).
    deadzone: f64,
}

impl AxisNormalizer {
    /// Creates a normalizer for the raw range `min..=max`.
    ///
    /// The deadzone is clamped to `0.0..=0.25`.
    #[must_use]
    pub fn new(min: i32, max: i32, deadzone: f32) -> Self {
        Self {
            min,
            max,
            deadzone: f64::from(deadzone).clamp(0.0, 0.25),
        }
    }

    /// Converts a raw axis value to `[-1, 1]`.
    #[must_use]
    pub fn normalize(&self, raw: i32) -> f64 {
        let half_range = (f64::from(self.max) - f64::from(self.min)) / 2.0;
        if half_range <= 0.0 {
            return 0.0;
        }
        let center = f64::from(self.min) + half_range;
        let centered = clamp_unit((f64::from(raw) - center) / half_range);

        let magnitude = centered.abs();
        if magnitude <= self.deadzone {
            0.0
        } else {
            // Scale remaining range to 0..1
            centered.signum() * (magnitude - self.deadzone) / (1.0 - self.deadzone)
        }
    }
}
