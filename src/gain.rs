//! # Gain Slider Mapping
//!
//! Velocity controller gains span orders of magnitude, so their sliders are
//! logarithmic: equal slider travel multiplies the gain by an equal factor.
//!
//! ```text
//! forward(pos) = exp(ln(max)·pos + ln(min)·(1 − pos))      pos ∈ [0, 1]
//! inverse(v)   = (ln(v) − ln(min)) / (ln(max) − ln(min))    v ∈ [min, max]
//! ```
//!
//! ```
//! use botwheel_teleop::gain::GainChannel;
//!
//! let range = GainChannel::VelGain.range();
//! assert_eq!(range.to_value(f64::NAN), None);
//! let value = range.to_value(0.3).unwrap();
//! assert!((range.to_position(value).unwrap() - 0.3).abs() < 1e-9);
//! ```

use tracing::warn;

use crate::protocol::frames::GainPair;

/// Bounds of the velocity gain [Nm/(turn/s)].
pub const VEL_GAIN_RANGE: (f64, f64) = (0.1, 10.0);

/// Bounds of the velocity integrator gain [Nm/turn].
pub const VEL_INTEGRATOR_GAIN_RANGE: (f64, f64) = (1.0, 100.0);

/// A strictly positive `[min, max]` range mapped logarithmically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRange {
    min: f64,
    max: f64,
}

impl LogRange {
    fn from_bounds((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clamps a value into the range.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Slider position (clamped to `[0, 1]`) to gain value.
    ///
    /// Returns `None` for NaN.
    #[must_use]
    pub fn to_value(&self, position: f64) -> Option<f64> {
        if position.is_nan() {
            return None;
        }
        let pos = position.clamp(0.0, 1.0);
        let value = (self.max.ln() * pos + self.min.ln() * (1.0 - pos)).exp();
        Some(self.clamp(value))
    }

    /// Gain value (clamped to `[min, max]`) to slider position.
    ///
    /// Returns `None` for NaN.
    #[must_use]
    pub fn to_position(&self, value: f64) -> Option<f64> {
        if value.is_nan() {
            return None;
        }
        let value = self.clamp(value);
        let pos = (value.ln() - self.min.ln()) / (self.max.ln() - self.min.ln());
        Some(pos.clamp(0.0, 1.0))
    }
}

/// The two tunable gain channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainChannel {
    VelGain,
    VelIntegratorGain,
}

impl GainChannel {
    #[must_use]
    pub fn range(self) -> LogRange {
        match self {
            Self::VelGain => LogRange::from_bounds(VEL_GAIN_RANGE),
            Self::VelIntegratorGain => LogRange::from_bounds(VEL_INTEGRATOR_GAIN_RANGE),
        }
    }

    /// Reads this channel from a gain pair.
    #[must_use]
    pub fn get(self, gains: &GainPair) -> Option<f64> {
        match self {
            Self::VelGain => gains.vel_gain,
            Self::VelIntegratorGain => gains.vel_integrator_gain,
        }
    }

    /// Writes this channel into a gain pair, clamped to its range.
    ///
    /// NaN is rejected and leaves the pair untouched. Returns `true` if the
    /// value was written.
    pub fn set(self, gains: &mut GainPair, value: f64) -> bool {
        if value.is_nan() {
            warn!("Ignoring NaN for {:?}", self);
            return false;
        }
        let value = self.range().clamp(value);
        match self {
            Self::VelGain => gains.vel_gain = Some(value),
            Self::VelIntegratorGain => gains.vel_integrator_gain = Some(value),
        }
        true
    }

    /// Slider position of this channel, `None` while the gain is unset.
    #[must_use]
    pub fn position(self, gains: &GainPair) -> Option<f64> {
        self.get(gains).and_then(|value| self.range().to_position(value))
    }
}
