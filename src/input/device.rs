//! # evdev Input Devices
//!
//! Reads keyboards, gamepads and multi-touch screens through the Linux evdev
//! interface and translates their raw events into [`InputEvent`]s for the
//! session.
//!
//! ## Device Detection
//!
//! Devices are classified by capability:
//!
//! | Kind | Required capability |
//! |---|---|
//! | Touchscreen | `ABS_MT_POSITION_X` |
//! | Gamepad | `BTN_SOUTH` plus the configured vel/yaw axes |
//! | Keyboard | `KEY_W` |
//!
//! ## Translation
//!
//! Keyboard events are forwarded as they arrive. Gamepad axis and touch
//! slot updates are buffered and emitted on `SYN_REPORT`, so one hardware
//! frame becomes one consistent update. Touch contacts follow the
//! multi-touch protocol B: `ABS_MT_SLOT` selects a slot,
//! `ABS_MT_TRACKING_ID` starts (`>= 0`) or ends (`-1`) a contact. Touch
//! coordinates are scaled from the panel's reported range onto the pointer
//! surface.
//!
//! Keys and buttons bound to an [`Action`] produce `InputEvent::Action` on
//! press.

use std::path::{Path, PathBuf};

use evdev::{AbsoluteAxisType, Device, InputEventKind, Key, Synchronization};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::actions::Action;
use super::curve::AxisNormalizer;
use super::keyboard::KeyName;
use super::pointer::{Point, PointerEvent, Surface};
use super::{InputEvent, JoystickId};
use crate::config::InputConfig;
use crate::error::{Result, TeleopError};

/// Directory scanned for event devices.
const INPUT_DIR: &str = "/dev/input";

/// Highest multi-touch slot tracked.
const MAX_TOUCH_SLOTS: usize = 16;

/// Capability class of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Keyboard,
    Gamepad,
    Touchscreen,
}

/// Gamepad axis assignment and normalization.
#[derive(Debug, Clone, Copy)]
pub struct StickMapping {
    pub vel_axis: AbsoluteAxisType,
    pub yaw_axis: AbsoluteAxisType,
    pub normalizer: AxisNormalizer,
}

impl StickMapping {
    #[must_use]
    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            vel_axis: AbsoluteAxisType(config.vel_axis),
            yaw_axis: AbsoluteAxisType(config.yaw_axis),
            normalizer: AxisNormalizer::new(config.axis_min, config.axis_max, config.stick_deadzone),
        }
    }
}

/// Classifies a device from its advertised capabilities.
#[must_use]
pub fn classify(device: &Device, mapping: &StickMapping) -> Option<DeviceKind> {
    let has_abs = |axis: AbsoluteAxisType| {
        device
            .supported_absolute_axes()
            .map_or(false, |axes| axes.contains(axis))
    };
    let has_key = |key: Key| device.supported_keys().map_or(false, |keys| keys.contains(key));

    if has_abs(AbsoluteAxisType::ABS_MT_POSITION_X) {
        Some(DeviceKind::Touchscreen)
    } else if has_key(Key::BTN_SOUTH) && has_abs(mapping.vel_axis) && has_abs(mapping.yaw_axis) {
        Some(DeviceKind::Gamepad)
    } else if has_key(Key::KEY_W) {
        Some(DeviceKind::Keyboard)
    } else {
        None
    }
}

/// Per-gamepad axis buffer.
#[derive(Debug, Clone)]
pub struct GamepadTranslator {
    id: JoystickId,
    mapping: StickMapping,
    vel: f64,
    yaw: f64,
    dirty: bool,
}

impl GamepadTranslator {
    #[must_use]
    pub fn new(id: JoystickId, mapping: StickMapping) -> Self {
        Self {
            id,
            mapping,
            vel: 0.0,
            yaw: 0.0,
            dirty: false,
        }
    }

    fn axis(&mut self, axis: AbsoluteAxisType, raw: i32) {
        // Stick Y grows downwards; forward is positive velocity
        if axis == self.mapping.vel_axis {
            self.vel = -self.mapping.normalizer.normalize(raw);
            self.dirty = true;
        } else if axis == self.mapping.yaw_axis {
            self.yaw = self.mapping.normalizer.normalize(raw);
            self.dirty = true;
        }
    }

    fn flush(&mut self, out: &mut Vec<InputEvent>) {
        if std::mem::take(&mut self.dirty) {
            out.push(InputEvent::JoystickAxes {
                id: self.id,
                vel: self.vel,
                yaw: self.yaw,
            });
        }
    }
}

/// Maps raw touch coordinates onto the pointer surface.
///
/// Every touchscreen reports its own raw range; scaling them all onto one
/// surface lets a full-width drag reach full deflection on any panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchGeometry {
    /// Raw `ABS_MT_POSITION_X` range
    pub x: (i32, i32),
    /// Raw `ABS_MT_POSITION_Y` range
    pub y: (i32, i32),
    pub surface: Surface,
}

impl TouchGeometry {
    /// Geometry whose raw range is `0..=extent` of the configured surface.
    #[must_use]
    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            x: (0, config.touch_extent_x),
            y: (0, config.touch_extent_y),
            surface: Surface::new(
                f64::from(config.touch_extent_x),
                f64::from(config.touch_extent_y),
            ),
        }
    }

    /// Same surface, different raw ranges.
    #[must_use]
    pub fn with_ranges(self, x: (i32, i32), y: (i32, i32)) -> Self {
        Self { x, y, ..self }
    }

    /// Raw contact position to surface coordinates.
    #[must_use]
    pub fn map(&self, x: i32, y: i32) -> Point {
        Point::new(
            scale(x, self.x, self.surface.width),
            scale(y, self.y, self.surface.height),
        )
    }
}

fn scale(raw: i32, (min, max): (i32, i32), extent: f64) -> f64 {
    if max <= min {
        return f64::from(raw);
    }
    (f64::from(raw) - f64::from(min)) / (f64::from(max) - f64::from(min)) * extent
}

#[derive(Debug, Clone, Default)]
struct TouchSlot {
    /// Contact currently in this slot
    tracking_id: Option<i32>,
    /// Contacts that left this slot since the last `SYN_REPORT` after their
    /// `Down` was reported
    lifted: Vec<i32>,
    x: i32,
    y: i32,
    /// `Down` for `tracking_id` not reported yet
    began: bool,
    moved: bool,
}

impl TouchSlot {
    fn begin(&mut self, id: i32) {
        self.end();
        self.tracking_id = Some(id);
        self.began = true;
    }

    fn end(&mut self) {
        if let Some(id) = self.tracking_id.take() {
            // A contact that came and went within one frame was never reported
            if !self.began {
                self.lifted.push(id);
            }
        }
        self.began = false;
        self.moved = false;
    }
}

/// Multi-touch protocol B slot tracker.
#[derive(Debug, Clone)]
pub struct TouchTranslator {
    geometry: TouchGeometry,
    slots: Vec<TouchSlot>,
    current: usize,
}

impl TouchTranslator {
    #[must_use]
    pub fn new(geometry: TouchGeometry) -> Self {
        Self {
            geometry,
            slots: vec![TouchSlot::default(); MAX_TOUCH_SLOTS],
            current: 0,
        }
    }

    fn axis(&mut self, axis: AbsoluteAxisType, value: i32) {
        if axis == AbsoluteAxisType::ABS_MT_SLOT {
            self.current = usize::try_from(value).unwrap_or(0).min(MAX_TOUCH_SLOTS - 1);
            return;
        }

        let slot = &mut self.slots[self.current];
        match axis {
            AbsoluteAxisType::ABS_MT_TRACKING_ID if value >= 0 => slot.begin(value),
            AbsoluteAxisType::ABS_MT_TRACKING_ID => slot.end(),
            AbsoluteAxisType::ABS_MT_POSITION_X => {
                slot.x = value;
                slot.moved = true;
            }
            AbsoluteAxisType::ABS_MT_POSITION_Y => {
                slot.y = value;
                slot.moved = true;
            }
            _ => {}
        }
    }

    fn flush(&mut self, out: &mut Vec<InputEvent>) {
        for slot in &mut self.slots {
            out.extend(
                slot.lifted
                    .drain(..)
                    .map(|id| InputEvent::Pointer(PointerEvent::Up { id: i64::from(id) })),
            );

            if let Some(id) = slot.tracking_id {
                let (id, at) = (i64::from(id), self.geometry.map(slot.x, slot.y));
                if slot.began {
                    out.push(InputEvent::Pointer(PointerEvent::Down { id, at }));
                } else if slot.moved {
                    out.push(InputEvent::Pointer(PointerEvent::Move { id, at }));
                }
            }
            slot.began = false;
            slot.moved = false;
        }
    }

    fn cancel_all(&mut self, out: &mut Vec<InputEvent>) {
        for slot in &mut self.slots {
            let reported = slot.tracking_id.filter(|_| !slot.began);
            for id in slot.lifted.drain(..).chain(reported) {
                out.push(InputEvent::Pointer(PointerEvent::Cancel { id: i64::from(id) }));
            }
            *slot = TouchSlot::default();
        }
    }
}

/// Turns raw evdev events of one device into [`InputEvent`]s.
#[derive(Debug, Clone)]
pub enum EventTranslator {
    Keyboard,
    Gamepad(GamepadTranslator),
    Touch(TouchTranslator),
}

impl EventTranslator {
    #[must_use]
    pub fn for_kind(
        kind: DeviceKind,
        joystick_id: JoystickId,
        mapping: StickMapping,
        geometry: TouchGeometry,
    ) -> Self {
        match kind {
            DeviceKind::Keyboard => Self::Keyboard,
            DeviceKind::Gamepad => Self::Gamepad(GamepadTranslator::new(joystick_id, mapping)),
            DeviceKind::Touchscreen => Self::Touch(TouchTranslator::new(geometry)),
        }
    }

    /// Events to emit when the device first becomes available.
    pub fn connected(&self, out: &mut Vec<InputEvent>) {
        if let Self::Gamepad(pad) = self {
            out.push(InputEvent::JoystickConnected { id: pad.id });
        }
    }

    /// Translates one raw event, appending any resulting events to `out`.
    pub fn translate(&mut self, event: &evdev::InputEvent, out: &mut Vec<InputEvent>) {
        match (self, event.kind()) {
            // value 2 is auto-repeat
            (Self::Keyboard, InputEventKind::Key(key)) => match (KeyName::from_evdev(key), event.value()) {
                (Some(key), value @ (0 | 1)) => out.push(InputEvent::Key {
                    key,
                    pressed: value == 1,
                }),
                (None, 1) => out.extend(Action::from_evdev(key).map(InputEvent::Action)),
                _ => {}
            },
            (Self::Gamepad(_), InputEventKind::Key(key)) if event.value() == 1 => {
                out.extend(Action::from_evdev(key).map(InputEvent::Action))
            }
            (Self::Gamepad(pad), InputEventKind::AbsAxis(axis)) => pad.axis(axis, event.value()),
            (Self::Gamepad(pad), InputEventKind::Synchronization(Synchronization::SYN_REPORT)) => {
                pad.flush(out)
            }
            (Self::Touch(touch), InputEventKind::AbsAxis(axis)) => touch.axis(axis, event.value()),
            (Self::Touch(touch), InputEventKind::Synchronization(Synchronization::SYN_REPORT)) => {
                touch.flush(out)
            }
            _ => {
                // Ignore other event types
            }
        }
    }

    /// Events that neutralize everything this device contributed, emitted
    /// when the device goes away.
    pub fn disconnected(&mut self, out: &mut Vec<InputEvent>) {
        match self {
            Self::Keyboard => {
                out.extend(KeyName::ALL.into_iter().map(|key| InputEvent::Key { key, pressed: false }));
            }
            Self::Gamepad(pad) => out.push(InputEvent::JoystickDisconnected { id: pad.id }),
            Self::Touch(touch) => touch.cancel_all(out),
        }
    }
}

/// An opened evdev device with its translator.
pub struct InputDevice {
    device: Device,
    path: PathBuf,
    kind: DeviceKind,
    translator: EventTranslator,
}

impl std::fmt::Debug for InputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDevice")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl InputDevice {
    /// Opens and classifies the device at `path`.
    ///
    /// # Errors
    ///
    /// - `Device`: the device cannot be opened or is not a supported kind
    pub fn open(
        path: &Path,
        joystick_id: JoystickId,
        mapping: StickMapping,
        geometry: TouchGeometry,
    ) -> Result<Self> {
        let device = Device::open(path)
            .map_err(|e| TeleopError::Device(format!("Failed to open {}: {}", path.display(), e)))?;
        let kind = classify(&device, &mapping).ok_or_else(|| {
            TeleopError::Device(format!("{} is not a keyboard, gamepad or touchscreen", path.display()))
        })?;

        info!(
            "Using {:?} {} ({})",
            kind,
            path.display(),
            device.name().unwrap_or("unnamed")
        );

        let geometry = match (kind, touch_ranges(&device)) {
            (DeviceKind::Touchscreen, Some((x, y))) => {
                debug!("{} touch range x {:?} y {:?}", path.display(), x, y);
                geometry.with_ranges(x, y)
            }
            (DeviceKind::Touchscreen, None) => {
                warn!("{} has no readable touch range, assuming the configured extent", path.display());
                geometry
            }
            _ => geometry,
        };

        Ok(Self {
            device,
            path: path.to_path_buf(),
            kind,
            translator: EventTranslator::for_kind(kind, joystick_id, mapping, geometry),
        })
    }

    /// Opens the configured devices, or every supported device under
    /// `/dev/input` when none are configured.
    ///
    /// # Errors
    ///
    /// - `DeviceNotFound`: no usable device was found
    /// - `Device`: `/dev/input` could not be read
    pub fn discover(config: &InputConfig) -> Result<Vec<Self>> {
        let mapping = StickMapping::from_config(config);
        let geometry = TouchGeometry::from_config(config);
        let paths: Vec<PathBuf> = if config.device_paths.is_empty() {
            scan_event_devices()?
        } else {
            config.device_paths.iter().map(PathBuf::from).collect()
        };

        let mut devices = Vec::new();
        let mut next_joystick: JoystickId = 0;
        for path in paths {
            match Self::open(&path, next_joystick, mapping, geometry) {
                Ok(device) => {
                    if device.kind == DeviceKind::Gamepad {
                        next_joystick += 1;
                    }
                    devices.push(device);
                }
                Err(e) => debug!("Skipping {}: {}", path.display(), e),
            }
        }

        if devices.is_empty() {
            return Err(TeleopError::DeviceNotFound);
        }
        Ok(devices)
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the device on a blocking thread, forwarding translated events
    /// until the device fails or the receiver is dropped.
    pub fn spawn_reader(mut self, tx: mpsc::Sender<InputEvent>) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            self.translator.connected(&mut out);
            if !forward(&tx, &mut out) {
                return;
            }

            loop {
                match self.device.fetch_events() {
                    Ok(events) => {
                        for event in events {
                            self.translator.translate(&event, &mut out);
                        }
                    }
                    Err(e) => {
                        warn!("Lost input device {}: {}", self.path.display(), e);
                        self.translator.disconnected(&mut out);
                        forward(&tx, &mut out);
                        return;
                    }
                }
                if !forward(&tx, &mut out) {
                    return;
                }
            }
        })
    }
}

/// Raw `(min, max)` of the multi-touch X and Y axes.
fn touch_ranges(device: &Device) -> Option<((i32, i32), (i32, i32))> {
    let state = device.get_abs_state().ok()?;
    let range = |axis: AbsoluteAxisType| {
        state
            .get(usize::from(axis.0))
            .map(|info| (info.minimum, info.maximum))
            .filter(|(min, max)| max > min)
    };
    Some((
        range(AbsoluteAxisType::ABS_MT_POSITION_X)?,
        range(AbsoluteAxisType::ABS_MT_POSITION_Y)?,
    ))
}

/// Sends buffered events. Returns `false` once the receiver is gone.
fn forward(tx: &mpsc::Sender<InputEvent>, out: &mut Vec<InputEvent>) -> bool {
    out.drain(..).all(|event| tx.blocking_send(event).is_ok())
}

/// Lists `/dev/input/event*` in a deterministic order.
fn scan_event_devices() -> Result<Vec<PathBuf>> {
    let input_dir = Path::new(INPUT_DIR);
    if !input_dir.exists() {
        return Err(TeleopError::Device(format!("{} directory not found", INPUT_DIR)));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .map_err(|e| TeleopError::Device(format!("Failed to read {}: {}", INPUT_DIR, e)))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .map_or(false, |name| name.to_string_lossy().starts_with("event"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::EventType;

    use crate::gain::GainChannel;
    use crate::protocol::frames::StateRequest;

    fn mapping() -> StickMapping {
        StickMapping::from_config(&InputConfig::default())
    }

    /// Raw range of 1024 onto a 2048 wide surface keeps the arithmetic exact
    fn geometry() -> TouchGeometry {
        TouchGeometry {
            x: (0, 1024),
            y: (0, 1024),
            surface: Surface::new(2048.0, 2048.0),
        }
    }

    fn touch() -> EventTranslator {
        EventTranslator::for_kind(DeviceKind::Touchscreen, 0, mapping(), geometry())
    }

    fn abs(axis: AbsoluteAxisType, value: i32) -> evdev::InputEvent {
        evdev::InputEvent::new(EventType::ABSOLUTE, axis.0, value)
    }

    fn key(key: Key, value: i32) -> evdev::InputEvent {
        evdev::InputEvent::new(EventType::KEY, key.code(), value)
    }

    fn syn() -> evdev::InputEvent {
        evdev::InputEvent::new(EventType::SYNCHRONIZATION, Synchronization::SYN_REPORT.0, 0)
    }

    fn run(translator: &mut EventTranslator, events: &[evdev::InputEvent]) -> Vec<InputEvent> {
        let mut out = Vec::new();
        for event in events {
            translator.translate(event, &mut out);
        }
        out
    }

    #[test]
    fn test_default_mapping_axes() {
        let mapping = mapping();
        assert_eq!(mapping.vel_axis, AbsoluteAxisType::ABS_Y);
        assert_eq!(mapping.yaw_axis, AbsoluteAxisType::ABS_RX);
    }

    #[test]
    fn test_keyboard_press_release() {
        let mut translator = EventTranslator::Keyboard;
        let out = run(&mut translator, &[key(Key::KEY_W, 1), key(Key::KEY_W, 0)]);
        assert_eq!(
            out,
            vec![
                InputEvent::Key { key: KeyName::W, pressed: true },
                InputEvent::Key { key: KeyName::W, pressed: false },
            ]
        );
    }

    #[test]
    fn test_keyboard_ignores_repeat_and_unmapped_keys() {
        let mut translator = EventTranslator::Keyboard;
        let out = run(&mut translator, &[key(Key::KEY_W, 2), key(Key::KEY_F1, 1)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_keyboard_action_keys() {
        let mut translator = EventTranslator::Keyboard;
        let out = run(
            &mut translator,
            &[
                key(Key::KEY_ENTER, 1),
                key(Key::KEY_ENTER, 2),
                key(Key::KEY_ENTER, 0),
                key(Key::KEY_RIGHTBRACE, 1),
            ],
        );
        assert_eq!(
            out,
            vec![
                InputEvent::Action(Action::State(StateRequest::Drive)),
                InputEvent::Action(Action::GainStep { channel: GainChannel::VelGain, up: true }),
            ]
        );
    }

    #[test]
    fn test_gamepad_button_actions() {
        let mut translator = EventTranslator::for_kind(DeviceKind::Gamepad, 0, mapping(), geometry());
        let out = run(
            &mut translator,
            &[key(Key::BTN_EAST, 1), key(Key::BTN_EAST, 0), key(Key::BTN_SOUTH, 1), syn()],
        );
        assert_eq!(out, vec![InputEvent::Action(Action::State(StateRequest::Brake))]);
    }

    #[test]
    fn test_gamepad_emits_on_syn() {
        let mut translator = EventTranslator::for_kind(DeviceKind::Gamepad, 3, mapping(), geometry());
        let out = run(
            &mut translator,
            &[abs(AbsoluteAxisType::ABS_Y, 0), abs(AbsoluteAxisType::ABS_RX, 255)],
        );
        assert!(out.is_empty());

        let out = run(&mut translator, &[syn()]);
        assert_eq!(out, vec![InputEvent::JoystickAxes { id: 3, vel: 1.0, yaw: 1.0 }]);

        // Nothing new, nothing emitted
        assert!(run(&mut translator, &[syn()]).is_empty());
    }

    #[test]
    fn test_gamepad_ignores_other_axes() {
        let mut translator = EventTranslator::for_kind(DeviceKind::Gamepad, 0, mapping(), geometry());
        let out = run(&mut translator, &[abs(AbsoluteAxisType::ABS_HAT0X, 1), syn()]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_gamepad_connect_and_disconnect() {
        let mut translator = EventTranslator::for_kind(DeviceKind::Gamepad, 1, mapping(), geometry());
        let mut out = Vec::new();
        translator.connected(&mut out);
        translator.disconnected(&mut out);
        assert_eq!(
            out,
            vec![
                InputEvent::JoystickConnected { id: 1 },
                InputEvent::JoystickDisconnected { id: 1 },
            ]
        );
    }

    #[test]
    fn test_touch_contact_lifecycle() {
        let mut translator = touch();
        let down = run(
            &mut translator,
            &[
                abs(AbsoluteAxisType::ABS_MT_SLOT, 0),
                abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 42),
                abs(AbsoluteAxisType::ABS_MT_POSITION_X, 100),
                abs(AbsoluteAxisType::ABS_MT_POSITION_Y, 200),
                syn(),
            ],
        );
        assert_eq!(
            down,
            vec![InputEvent::Pointer(PointerEvent::Down { id: 42, at: Point::new(200.0, 400.0) })]
        );

        let moved = run(&mut translator, &[abs(AbsoluteAxisType::ABS_MT_POSITION_Y, 150), syn()]);
        assert_eq!(
            moved,
            vec![InputEvent::Pointer(PointerEvent::Move { id: 42, at: Point::new(200.0, 300.0) })]
        );

        let up = run(&mut translator, &[abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, -1), syn()]);
        assert_eq!(up, vec![InputEvent::Pointer(PointerEvent::Up { id: 42 })]);
    }

    #[test]
    fn test_touch_two_slots() {
        let mut translator = touch();
        let out = run(
            &mut translator,
            &[
                abs(AbsoluteAxisType::ABS_MT_SLOT, 0),
                abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 1),
                abs(AbsoluteAxisType::ABS_MT_POSITION_X, 10),
                abs(AbsoluteAxisType::ABS_MT_SLOT, 1),
                abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 2),
                abs(AbsoluteAxisType::ABS_MT_POSITION_X, 20),
                syn(),
            ],
        );
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], InputEvent::Pointer(PointerEvent::Down { id: 1, .. })));
        assert!(matches!(out[1], InputEvent::Pointer(PointerEvent::Down { id: 2, .. })));
    }

    #[test]
    fn test_touch_lift_and_new_contact_in_one_frame() {
        let mut translator = touch();
        run(&mut translator, &[abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 5), syn()]);

        let out = run(
            &mut translator,
            &[
                abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, -1),
                abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 6),
                abs(AbsoluteAxisType::ABS_MT_POSITION_X, 512),
                syn(),
            ],
        );
        assert_eq!(
            out,
            vec![
                InputEvent::Pointer(PointerEvent::Up { id: 5 }),
                InputEvent::Pointer(PointerEvent::Down { id: 6, at: Point::new(1024.0, 0.0) }),
            ]
        );

        let up = run(&mut translator, &[abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, -1), syn()]);
        assert_eq!(up, vec![InputEvent::Pointer(PointerEvent::Up { id: 6 })]);
    }

    #[test]
    fn test_touch_id_replaced_without_lift() {
        let mut translator = touch();
        run(&mut translator, &[abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 5), syn()]);

        let out = run(&mut translator, &[abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 6), syn()]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], InputEvent::Pointer(PointerEvent::Up { id: 5 }));
        assert!(matches!(out[1], InputEvent::Pointer(PointerEvent::Down { id: 6, .. })));

        // Only the live contact is cancelled
        let mut out = Vec::new();
        translator.disconnected(&mut out);
        assert_eq!(out, vec![InputEvent::Pointer(PointerEvent::Cancel { id: 6 })]);
    }

    #[test]
    fn test_touch_tap_within_one_frame_is_dropped() {
        let mut translator = touch();
        let out = run(
            &mut translator,
            &[
                abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 9),
                abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, -1),
                syn(),
            ],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_touch_geometry_scales_device_range() {
        let config = InputConfig::default();
        let geometry = TouchGeometry::from_config(&config).with_ranges((0, 1920), (0, 1080));
        assert_eq!(
            geometry.map(1920, 1080),
            Point::new(f64::from(config.touch_extent_x), f64::from(config.touch_extent_y))
        );
        assert_eq!(geometry.map(0, 0), Point::new(0.0, 0.0));

        let mut translator =
            EventTranslator::for_kind(DeviceKind::Touchscreen, 0, mapping(), geometry);
        let out = run(
            &mut translator,
            &[
                abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 1),
                abs(AbsoluteAxisType::ABS_MT_POSITION_X, 1920),
                abs(AbsoluteAxisType::ABS_MT_POSITION_Y, 1080),
                syn(),
            ],
        );
        assert_eq!(
            out,
            vec![InputEvent::Pointer(PointerEvent::Down {
                id: 1,
                at: Point::new(f64::from(config.touch_extent_x), f64::from(config.touch_extent_y)),
            })]
        );
    }

    #[test]
    fn test_touch_geometry_from_config_is_identity() {
        let geometry = TouchGeometry::from_config(&InputConfig::default());
        assert_eq!(geometry.map(0, 0), Point::new(0.0, 0.0));
        assert_eq!(geometry.map(4095, 4095), Point::new(4095.0, 4095.0));
    }

    #[test]
    fn test_touch_disconnect_cancels_contacts() {
        let mut translator = touch();
        run(
            &mut translator,
            &[abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 5), syn()],
        );

        let mut out = Vec::new();
        translator.disconnected(&mut out);
        assert_eq!(out, vec![InputEvent::Pointer(PointerEvent::Cancel { id: 5 })]);
    }

    #[test]
    fn test_keyboard_disconnect_releases_keys() {
        let mut translator = EventTranslator::Keyboard;
        let mut out = Vec::new();
        translator.disconnected(&mut out);
        assert!(out.contains(&InputEvent::Key { key: KeyName::Shift, pressed: false }));
        assert!(out.iter().all(|event| matches!(event, InputEvent::Key { pressed: false, .. })));
    }

    #[test]
    fn test_open_nonexistent_device() {
        let result = InputDevice::open(
            Path::new("/dev/input/nonexistent_event99"),
            0,
            mapping(),
            geometry(),
        );
        match result {
            Err(TeleopError::Device(msg)) => assert!(msg.contains("nonexistent_event99")),
            other => panic!("Expected Device error, got: {:?}", other),
        }
    }

    #[test]
    fn test_discover_with_invalid_paths() {
        let config = InputConfig {
            device_paths: vec!["/dev/input/nonexistent_event98".to_string()],
            ..InputConfig::default()
        };
        assert!(matches!(InputDevice::discover(&config), Err(TeleopError::DeviceNotFound)));
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_discover_with_real_hardware() {
        let devices = InputDevice::discover(&InputConfig::default()).expect("No input devices");
        for device in &devices {
            println!("{:?}", device);
        }
    }
}
