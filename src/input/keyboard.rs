//! # Keyboard Adapter
//!
//! Arrow keys and WASD drive the robot; holding Shift switches from the
//! slow default speed to full speed.
//!
//! | Keys | Axis |
//! |---|---|
//! | ArrowUp / W, ArrowDown / S | `vel` (forward − backward) |
//! | ArrowRight / D, ArrowLeft / A | `yaw` (right − left) |
//! | Left or right Shift | speed factor 1.0 instead of 0.3 |

use std::collections::HashSet;
use std::str::FromStr;

use evdev::Key;

use super::InputSample;

/// Speed factor while the boost modifier is held.
pub const BOOST_FACTOR: f64 = 1.0;

/// Speed factor without the boost modifier.
pub const NORMAL_FACTOR: f64 = 0.3;

/// Logical keys the keyboard adapter cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyName {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
    /// Left Shift (also plain `"Shift"`)
    Shift,
    RightShift,
}

impl KeyName {
    /// Every logical key, e.g. for releasing all of them.
    pub const ALL: [KeyName; 10] = [
        Self::ArrowUp,
        Self::ArrowDown,
        Self::ArrowLeft,
        Self::ArrowRight,
        Self::W,
        Self::A,
        Self::S,
        Self::D,
        Self::Shift,
        Self::RightShift,
    ];

    /// Maps an evdev key code. Keys that do not drive anything yield `None`.
    #[must_use]
    pub fn from_evdev(key: Key) -> Option<Self> {
        match key {
            Key::KEY_UP => Some(Self::ArrowUp),
            Key::KEY_DOWN => Some(Self::ArrowDown),
            Key::KEY_LEFT => Some(Self::ArrowLeft),
            Key::KEY_RIGHT => Some(Self::ArrowRight),
            Key::KEY_W => Some(Self::W),
            Key::KEY_A => Some(Self::A),
            Key::KEY_S => Some(Self::S),
            Key::KEY_D => Some(Self::D),
            Key::KEY_LEFTSHIFT => Some(Self::Shift),
            Key::KEY_RIGHTSHIFT => Some(Self::RightShift),
            _ => None,
        }
    }
}

impl FromStr for KeyName {
    type Err = ();

    /// Parses browser-style key names (`"ArrowUp"`, `"w"`, `"ShiftRight"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ArrowUp" => Ok(Self::ArrowUp),
            "ArrowDown" => Ok(Self::ArrowDown),
            "ArrowLeft" => Ok(Self::ArrowLeft),
            "ArrowRight" => Ok(Self::ArrowRight),
            "w" | "W" => Ok(Self::W),
            "a" | "A" => Ok(Self::A),
            "s" | "S" => Ok(Self::S),
            "d" | "D" => Ok(Self::D),
            "Shift" | "ShiftLeft" => Ok(Self::Shift),
            "ShiftRight" => Ok(Self::RightShift),
            _ => Err(()),
        }
    }
}

/// Tracks held keys and turns them into an [`InputSample`].
#[derive(Debug, Clone, Default)]
pub struct KeyboardAdapter {
    held: HashSet<KeyName>,
}

impl KeyboardAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key press or release.
    ///
    /// Returns `true` if the held set changed (auto-repeat presses don't).
    pub fn handle(&mut self, key: KeyName, pressed: bool) -> bool {
        if pressed {
            self.held.insert(key)
        } else {
            self.held.remove(&key)
        }
    }

    #[must_use]
    pub fn is_held(&self, key: KeyName) -> bool {
        self.held.contains(&key)
    }

    /// Releases everything, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Current contribution of the held keys.
    #[must_use]
    pub fn sample(&self) -> InputSample {
        let factor = if self.is_held(KeyName::Shift) || self.is_held(KeyName::RightShift) {
            BOOST_FACTOR
        } else {
            NORMAL_FACTOR
        };

        let vel = self.axis(
            [KeyName::ArrowUp, KeyName::W],
            [KeyName::ArrowDown, KeyName::S],
        );
        let yaw = self.axis(
            [KeyName::ArrowRight, KeyName::D],
            [KeyName::ArrowLeft, KeyName::A],
        );

        InputSample::new(vel * factor, yaw * factor)
    }

    /// `+1`, `0` or `-1` depending on which synonym pair is held.
    fn axis(&self, positive: [KeyName; 2], negative: [KeyName; 2]) -> f64 {
        let held = |keys: [KeyName; 2]| keys.iter().any(|key| self.is_held(*key));
        match (held(positive), held(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_held() {
        assert_eq!(KeyboardAdapter::new().sample(), InputSample::ZERO);
    }

    #[test]
    fn test_w_without_shift_is_slow() {
        let mut keyboard = KeyboardAdapter::new();
        keyboard.handle(KeyName::W, true);
        assert_eq!(keyboard.sample(), InputSample::new(0.3, 0.0));
    }

    #[test]
    fn test_w_with_shift_is_full_speed() {
        let mut keyboard = KeyboardAdapter::new();
        keyboard.handle(KeyName::Shift, true);
        keyboard.handle(KeyName::W, true);
        assert_eq!(keyboard.sample(), InputSample::new(1.0, 0.0));
    }

    #[test]
    fn test_either_shift_boosts() {
        let mut keyboard = KeyboardAdapter::new();
        keyboard.handle(KeyName::RightShift, true);
        keyboard.handle(KeyName::W, true);
        assert_eq!(keyboard.sample().vel, 1.0);
    }

    #[test]
    fn test_releasing_one_shift_keeps_boost() {
        let mut keyboard = KeyboardAdapter::new();
        keyboard.handle(KeyName::W, true);
        keyboard.handle(KeyName::Shift, true);
        keyboard.handle(KeyName::RightShift, true);

        keyboard.handle(KeyName::RightShift, false);
        assert_eq!(keyboard.sample().vel, 1.0);

        keyboard.handle(KeyName::Shift, false);
        assert_eq!(keyboard.sample().vel, 0.3);
    }

    #[test]
    fn test_synonyms_do_not_stack() {
        let mut keyboard = KeyboardAdapter::new();
        keyboard.handle(KeyName::W, true);
        keyboard.handle(KeyName::ArrowUp, true);
        assert_eq!(keyboard.sample().vel, 0.3);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut keyboard = KeyboardAdapter::new();
        keyboard.handle(KeyName::A, true);
        keyboard.handle(KeyName::ArrowRight, true);
        assert_eq!(keyboard.sample().yaw, 0.0);
    }

    #[test]
    fn test_backward_and_left() {
        let mut keyboard = KeyboardAdapter::new();
        keyboard.handle(KeyName::ArrowDown, true);
        keyboard.handle(KeyName::ArrowLeft, true);
        keyboard.handle(KeyName::Shift, true);
        assert_eq!(keyboard.sample(), InputSample::new(-1.0, -1.0));
    }

    #[test]
    fn test_release() {
        let mut keyboard = KeyboardAdapter::new();
        keyboard.handle(KeyName::D, true);
        assert!(keyboard.handle(KeyName::D, false));
        assert_eq!(keyboard.sample(), InputSample::ZERO);
    }

    #[test]
    fn test_repeat_press_reports_no_change() {
        let mut keyboard = KeyboardAdapter::new();
        assert!(keyboard.handle(KeyName::S, true));
        assert!(!keyboard.handle(KeyName::S, true));
    }

    #[test]
    fn test_release_all() {
        let mut keyboard = KeyboardAdapter::new();
        keyboard.handle(KeyName::S, true);
        keyboard.handle(KeyName::Shift, true);
        keyboard.release_all();
        assert!(!keyboard.is_held(KeyName::Shift));
        assert_eq!(keyboard.sample(), InputSample::ZERO);
    }

    #[test]
    fn test_key_name_from_str() {
        assert_eq!("ArrowUp".parse::<KeyName>(), Ok(KeyName::ArrowUp));
        assert_eq!("w".parse::<KeyName>(), Ok(KeyName::W));
        assert_eq!("D".parse::<KeyName>(), Ok(KeyName::D));
        assert_eq!("Shift".parse::<KeyName>(), Ok(KeyName::Shift));
        assert_eq!("ShiftRight".parse::<KeyName>(), Ok(KeyName::RightShift));
        assert_eq!("Enter".parse::<KeyName>(), Err(()));
    }

    #[test]
    fn test_key_name_from_evdev() {
        assert_eq!(KeyName::from_evdev(Key::KEY_UP), Some(KeyName::ArrowUp));
        assert_eq!(KeyName::from_evdev(Key::KEY_A), Some(KeyName::A));
        assert_eq!(KeyName::from_evdev(Key::KEY_LEFTSHIFT), Some(KeyName::Shift));
        assert_eq!(KeyName::from_evdev(Key::KEY_RIGHTSHIFT), Some(KeyName::RightShift));
        assert_eq!(KeyName::from_evdev(Key::KEY_ENTER), None);
    }
}
