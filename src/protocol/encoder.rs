//! # Frame Encoder
//!
//! Serializes outbound frames to JSON text.

use super::frames::{Command, GainPair, GainValues, GainsFrame};
use crate::error::{Result, TeleopError};

/// Encodes a drive command frame.
///
/// # Examples
///
/// ```
/// use botwheel_teleop::protocol::encoder::encode_command_frame;
/// use botwheel_teleop::protocol::frames::{Command, StateRequest};
///
/// let frame = encode_command_frame(&Command::new(0.5, 0.0, Some(StateRequest::Drive)))?;
/// assert_eq!(frame, r#"{"vel":0.5,"yaw":0.0,"state":"drive"}"#);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn encode_command_frame(command: &Command) -> Result<String> {
    Ok(serde_json::to_string(command)?)
}

/// Encodes a gain update frame.
///
/// # Errors
///
/// Returns `Protocol` if either gain is unset; unset gains are never sent.
pub fn encode_gains_frame(gains: &GainPair) -> Result<String> {
    let (vel_gain, vel_integrator_gain) = gains
        .complete()
        .ok_or_else(|| TeleopError::Protocol("Refusing to send unset gains".to_string()))?;

    let frame = GainsFrame {
        config: GainValues {
            vel_gain,
            vel_integrator_gain,
        },
    };
    Ok(serde_json::to_string(&frame)?)
}
