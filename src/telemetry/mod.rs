//! # Telemetry Display
//!
//! Formats the cached telemetry frame for the operator.
//!
//! Every field is rendered independently: a value the robot has not
//! reported (or that did not decode as a finite number) shows as
//! [`UNKNOWN`] without affecting the fields around it.

use std::fmt;

use crate::protocol::faults::{describe_error, UNKNOWN};
use crate::protocol::frames::{MotorTelemetry, Telemetry};

/// Formats an optional reading with fixed precision and an optional unit.
#[must_use]
pub fn format_reading(value: Option<f64>, precision: usize, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if unit.is_empty() {
                format!("{:.*}", precision, v)
            } else {
                format!("{:.*} {}", precision, v, unit)
            }
        }
        _ => UNKNOWN.to_string(),
    }
}

/// Display strings of one motor controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorView {
    pub error: String,
    pub state: String,
    pub vel: String,
    pub dc_voltage: String,
    pub dc_current: String,
    pub torque_setpoint: String,
    pub torque_estimate: String,
    pub fet_temp: String,
    pub motor_temp: String,
}

impl MotorView {
    #[must_use]
    pub fn from_motor(motor: &MotorTelemetry) -> Self {
        Self {
            error: describe_error(motor.error),
            state: motor
                .state
                .map_or_else(|| UNKNOWN.to_string(), |state| state.to_string()),
            vel: format_reading(motor.vel, 2, "turns/s"),
            dc_voltage: format_reading(motor.dc_voltage, 1, "V"),
            dc_current: format_reading(motor.dc_current, 2, "A"),
            torque_setpoint: format_reading(motor.torque_setpoint, 3, "Nm"),
            torque_estimate: format_reading(motor.torque_estimate, 3, "Nm"),
            fet_temp: format_reading(motor.fet_temp, 1, "°C"),
            motor_temp: format_reading(motor.motor_temp, 1, "°C"),
        }
    }
}

impl Default for MotorView {
    fn default() -> Self {
        Self::from_motor(&MotorTelemetry::default())
    }
}

/// Display strings of a whole telemetry frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryView {
    pub state: String,
    pub armed: bool,
    pub vel: String,
    pub yaw: String,
    pub left: MotorView,
    pub right: MotorView,
    pub vel_gain: String,
    pub vel_integrator_gain: String,
}

impl TelemetryView {
    /// Builds the view of a cached frame; `None` renders all fields unknown.
    #[must_use]
    pub fn new(telemetry: Option<&Telemetry>) -> Self {
        let Some(telemetry) = telemetry else {
            return Self::default();
        };

        let gains = telemetry.config.unwrap_or_default();
        Self {
            state: if telemetry.state.is_empty() {
                UNKNOWN.to_string()
            } else {
                telemetry.state.clone()
            },
            armed: telemetry.robot_state().is_armed(),
            vel: format_reading(telemetry.vel, 2, "m/s"),
            yaw: format_reading(telemetry.yaw, 2, "turns/s"),
            left: MotorView::from_motor(&telemetry.odrives.left),
            right: MotorView::from_motor(&telemetry.odrives.right),
            vel_gain: format_reading(gains.vel_gain, 2, ""),
            vel_integrator_gain: format_reading(gains.vel_integrator_gain, 2, ""),
        }
    }
}

impl Default for TelemetryView {
    fn default() -> Self {
        Self {
            state: UNKNOWN.to_string(),
            armed: false,
            vel: UNKNOWN.to_string(),
            yaw: UNKNOWN.to_string(),
            left: MotorView::default(),
            right: MotorView::default(),
            vel_gain: UNKNOWN.to_string(),
            vel_integrator_gain: UNKNOWN.to_string(),
        }
    }
}

impl fmt::Display for TelemetryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state={} vel={} yaw={} gains={}/{}",
            self.state, self.vel, self.yaw, self.vel_gain, self.vel_integrator_gain
        )?;
        for (side, motor) in [("left", &self.left), ("right", &self.right)] {
            write!(
                f,
                " | {}: [{}] {} {} fet={} motor={}",
                side, motor.error, motor.dc_voltage, motor.dc_current, motor.fet_temp, motor.motor_temp
            )?;
        }
        Ok(())
    }
}
