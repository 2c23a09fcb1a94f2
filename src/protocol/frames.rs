//! # Frame Types
//!
//! Wire shapes of the robot protocol.
//!
//! ## Outbound
//!
//! ```text
//! {"vel": 0.3, "yaw": 0.0, "state": null}
//! {"config": {"vel_gain": 3.0, "vel_integrator_gain": 25.0}}
//! ```
//!
//! ## Inbound
//!
//! ```text
//! {"state": "drive", "vel": 0.29, "yaw": 0.0,
//!  "odrives": {"left": {...}, "right": {...}},
//!  "config": {"vel_gain": 3.0, "vel_integrator_gain": 25.0}}
//! ```
//!
//! Numeric telemetry fields are optional: the robot reports `null` until a
//! motor controller has sent the corresponding message, and anything that
//! is not a finite number is treated the same way.

use serde::{Deserialize, Deserializer, Serialize};

/// One-shot drive state request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateRequest {
    /// Arm the motors for closed-loop driving
    Drive,
    /// Disarm and let the wheels spin freely
    Coast,
    /// Hold zero velocity, then coast
    Brake,
}

/// Drive command in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Command {
    /// Linear velocity [m/s]
    pub vel: f64,
    /// Yaw rate [turns/s]
    pub yaw: f64,
    pub state: Option<StateRequest>,
}

impl Command {
    #[must_use]
    pub fn new(vel: f64, yaw: f64, state: Option<StateRequest>) -> Self {
        Self { vel, yaw, state }
    }
}

/// Velocity controller gains. `None` means "not known yet".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GainPair {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub vel_gain: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub vel_integrator_gain: Option<f64>,
}

impl GainPair {
    #[must_use]
    pub fn new(vel_gain: f64, vel_integrator_gain: f64) -> Self {
        Self {
            vel_gain: Some(vel_gain),
            vel_integrator_gain: Some(vel_integrator_gain),
        }
    }

    /// Both gains as numbers, or `None` if either is unset.
    #[must_use]
    pub fn complete(&self) -> Option<(f64, f64)> {
        Some((self.vel_gain?, self.vel_integrator_gain?))
    }
}

/// Outbound gain update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainsFrame {
    pub config: GainValues,
}

/// Gain values as sent; never contains unset sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainValues {
    pub vel_gain: f64,
    pub vel_integrator_gain: f64,
}

/// Telemetry of one motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct MotorTelemetry {
    /// Active fault bitmask
    #[serde(default, deserialize_with = "lenient_u32")]
    pub error: Option<u32>,
    /// Axis state as reported by the controller
    #[serde(default, deserialize_with = "lenient_u32")]
    pub state: Option<u32>,
    /// Wheel velocity [turns/s]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub vel: Option<f64>,
    /// Bus voltage [V]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub dc_voltage: Option<f64>,
    /// Bus current [A]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub dc_current: Option<f64>,
    /// Commanded torque [Nm]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub torque_setpoint: Option<f64>,
    /// Estimated torque [Nm]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub torque_estimate: Option<f64>,
    /// Inverter temperature [°C]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fet_temp: Option<f64>,
    /// Motor thermistor temperature [°C]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub motor_temp: Option<f64>,
}

/// Telemetry of both drive motors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct MotorPair {
    #[serde(default)]
    pub left: MotorTelemetry,
    #[serde(default)]
    pub right: MotorTelemetry,
}

/// One inbound telemetry frame.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Telemetry {
    #[serde(default)]
    pub state: String,
    /// Measured linear velocity [m/s]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub vel: Option<f64>,
    /// Measured yaw rate [turns/s]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub yaw: Option<f64>,
    #[serde(default)]
    pub odrives: MotorPair,
    #[serde(default)]
    pub config: Option<GainPair>,
}

impl Telemetry {
    #[must_use]
    pub fn robot_state(&self) -> RobotState {
        RobotState::from_wire(&self.state)
    }
}

/// Drive state reported by the robot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotState {
    WaitingForOdrives,
    Coast,
    EnteringDrive,
    Drive,
    Brake,
    EnteringCoast,
    Other(String),
}

impl RobotState {
    #[must_use]
    pub fn from_wire(state: &str) -> Self {
        match state {
            "waiting-for-odrives" => Self::WaitingForOdrives,
            "coast" => Self::Coast,
            "entering-drive" => Self::EnteringDrive,
            "drive" => Self::Drive,
            "brake" => Self::Brake,
            "entering-coast" => Self::EnteringCoast,
            other => Self::Other(other.to_string()),
        }
    }

    /// `true` while the motors are under closed-loop control.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Drive | Self::Brake)
    }
}

/// Accepts any JSON value; keeps it only if it is a finite number.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_f64)
        .filter(|v| v.is_finite()))
}

/// Accepts any JSON value; keeps it only if it fits a `u32`.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|v| u32::try_from(v).ok()))
}
