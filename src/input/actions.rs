//! # Discrete Actions
//!
//! Keys and gamepad buttons that do something once per press instead of
//! contributing to the drive command.
//!
//! | Action | Keyboard | Gamepad |
//! |---|---|---|
//! | Request `drive` | Enter | Start |
//! | Request `coast` | C | Select |
//! | Request `brake` | Space | East (○ / B) |
//! | `vel_gain` down / up | `[` / `]` | L1 / R1 |
//! | `vel_integrator_gain` down / up | `-` / `=` | L2 / R2 |
//! | Ask for tilt sensor access | T | |

use evdev::Key;

use crate::gain::GainChannel;
use crate::protocol::frames::StateRequest;

/// Slider travel of one gain step.
pub const GAIN_STEP: f64 = 0.05;

/// A one-shot operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Ask the robot to change drive state
    State(StateRequest),
    /// Move a gain slider by one [`GAIN_STEP`]
    GainStep { channel: GainChannel, up: bool },
    /// Ask the host for orientation sensor access
    RequestOrientationPermission,
}

impl Action {
    /// Maps a key or button code. Codes without an action yield `None`.
    #[must_use]
    pub fn from_evdev(key: Key) -> Option<Self> {
        let action = match key {
            Key::KEY_ENTER | Key::BTN_START => Self::State(StateRequest::Drive),
            Key::KEY_C | Key::BTN_SELECT => Self::State(StateRequest::Coast),
            Key::KEY_SPACE | Key::BTN_EAST => Self::State(StateRequest::Brake),
            Key::KEY_LEFTBRACE | Key::BTN_TL => Self::gain(GainChannel::VelGain, false),
            Key::KEY_RIGHTBRACE | Key::BTN_TR => Self::gain(GainChannel::VelGain, true),
            Key::KEY_MINUS | Key::BTN_TL2 => Self::gain(GainChannel::VelIntegratorGain, false),
            Key::KEY_EQUAL | Key::BTN_TR2 => Self::gain(GainChannel::VelIntegratorGain, true),
            Key::KEY_T => Self::RequestOrientationPermission,
            _ => return None,
        };
        Some(action)
    }

    fn gain(channel: GainChannel, up: bool) -> Self {
        Self::GainStep { channel, up }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_keys() {
        assert_eq!(Action::from_evdev(Key::KEY_ENTER), Some(Action::State(StateRequest::Drive)));
        assert_eq!(Action::from_evdev(Key::BTN_START), Some(Action::State(StateRequest::Drive)));
        assert_eq!(Action::from_evdev(Key::KEY_C), Some(Action::State(StateRequest::Coast)));
        assert_eq!(Action::from_evdev(Key::BTN_EAST), Some(Action::State(StateRequest::Brake)));
        assert_eq!(Action::from_evdev(Key::KEY_SPACE), Some(Action::State(StateRequest::Brake)));
    }

    #[test]
    fn test_gain_keys() {
        assert_eq!(
            Action::from_evdev(Key::KEY_RIGHTBRACE),
            Some(Action::GainStep { channel: GainChannel::VelGain, up: true })
        );
        assert_eq!(
            Action::from_evdev(Key::BTN_TL2),
            Some(Action::GainStep { channel: GainChannel::VelIntegratorGain, up: false })
        );
    }

    #[test]
    fn test_drive_keys_have_no_action() {
        for key in [Key::KEY_W, Key::KEY_UP, Key::KEY_LEFTSHIFT, Key::BTN_SOUTH] {
            assert_eq!(Action::from_evdev(key), None);
        }
    }

    #[test]
    fn test_gain_step_divides_slider() {
        let steps = (1.0 / GAIN_STEP).round();
        assert!((steps * GAIN_STEP - 1.0).abs() < 1e-12);
    }
}
