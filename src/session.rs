//! # Teleop Session
//!
//! All mutable client state in one place.
//!
//! The session owns every adapter, the transmitter's last-sent records, the
//! local gains, the cached telemetry and the link. Each piece of state has
//! a single writer: adapters only touch their own tracks/keys/sticks/zero
//! point, the transmitter only its last-sent records, and the decoder path
//! only the telemetry cache. Every hook runs to completion before the next
//! one, so a command is always computed and sent from one input snapshot.

use tracing::{debug, info, warn};

use crate::arbiter::arbitrate;
use crate::config::InputConfig;
use crate::gain::GainChannel;
use crate::input::joystick::{JoystickAdapter, PollOutcome};
use crate::input::keyboard::KeyboardAdapter;
use crate::input::orientation::{OrientationAdapter, Permission};
use crate::input::pointer::{PointerAdapter, Surface};
use crate::input::actions::{Action, GAIN_STEP};
use crate::input::InputEvent;
use crate::link::{Link, LinkEvent, LinkStatus};
use crate::protocol::decoder::decode_telemetry_frame;
use crate::protocol::frames::{Command, GainPair, StateRequest, Telemetry};
use crate::telemetry::TelemetryView;
use crate::transmitter::Transmitter;

/// Client session bound to one link.
pub struct Session<L: Link> {
    link: L,
    status: LinkStatus,

    pointer: PointerAdapter,
    keyboard: KeyboardAdapter,
    joystick: JoystickAdapter,
    orientation: OrientationAdapter,

    transmitter: Transmitter,
    command: Command,
    gains: GainPair,
    telemetry: Option<Telemetry>,
}

impl<L: Link> Session<L> {
    /// Creates a session with a pointer surface from the configured touch
    /// extents.
    pub fn new(config: &InputConfig, link: L) -> Self {
        let surface = Surface::new(
            f64::from(config.touch_extent_x),
            f64::from(config.touch_extent_y),
        );
        Self {
            link,
            status: LinkStatus::Disconnected,
            pointer: PointerAdapter::new(surface),
            keyboard: KeyboardAdapter::new(),
            joystick: JoystickAdapter::new(),
            orientation: OrientationAdapter::new(),
            transmitter: Transmitter::new(),
            command: Command::new(0.0, 0.0, None),
            gains: GainPair::default(),
            telemetry: None,
        }
    }

    pub fn status(&self) -> &LinkStatus {
        &self.status
    }

    /// Last command computed by the arbiter (sent or not).
    pub fn command(&self) -> Command {
        self.command
    }

    /// Local gains; `None` fields are still unset.
    pub fn gains(&self) -> GainPair {
        self.gains
    }

    pub fn telemetry(&self) -> Option<&Telemetry> {
        self.telemetry.as_ref()
    }

    /// Display strings of the cached telemetry.
    pub fn view(&self) -> TelemetryView {
        TelemetryView::new(self.telemetry.as_ref())
    }

    pub fn orientation_permission(&self) -> Permission {
        self.orientation.permission()
    }

    pub fn is_polling_joysticks(&self) -> bool {
        self.joystick.is_polling()
    }

    /// Marks a connection attempt as in flight.
    pub fn set_connecting(&mut self) {
        self.status = LinkStatus::Connecting;
    }

    /// Updates the pointer surface size.
    pub fn set_surface(&mut self, surface: Surface) {
        self.pointer.set_surface(surface);
    }

    /// Discrete input hook.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pointer(event) => {
                self.pointer.handle(event);
                self.update_command();
            }
            InputEvent::Key { key, pressed } => {
                if self.keyboard.handle(key, pressed) {
                    self.update_command();
                }
            }
            InputEvent::JoystickConnected { id } => self.joystick.connect(id),
            InputEvent::JoystickDisconnected { id } => self.joystick.disconnect(id),
            InputEvent::JoystickAxes { id, vel, yaw } => self.joystick.update_axes(id, vel, yaw),
            InputEvent::Orientation(reading) => {
                self.orientation.update(reading);
                if self.orientation.is_held() {
                    self.update_command();
                }
            }
            InputEvent::TiltHold { pressed } => {
                self.orientation.set_hold(pressed);
                self.update_command();
            }
            InputEvent::OrientationPermission { granted } => {
                self.orientation.set_permission(granted);
            }
            InputEvent::Action(action) => self.perform(action),
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::State(state) => self.request_state(state),
            Action::GainStep { channel, up } => self.step_gain(channel, up),
            Action::RequestOrientationPermission => {
                if !self.request_orientation_permission() {
                    debug!("Orientation access already granted");
                }
            }
        }
    }

    /// Periodic tick hook; drives the joystick poll task.
    pub fn on_tick(&mut self) {
        match self.joystick.poll() {
            PollOutcome::Idle => {}
            PollOutcome::Sample | PollOutcome::Final => self.update_command(),
        }
    }

    /// Sends a one-shot state request along with the current motion.
    pub fn request_state(&mut self, state: StateRequest) {
        info!("Requesting state {:?}", state);
        self.arbitrate_and_send(Some(state));
    }

    /// Asks for orientation sensor access. Returns `false` if already granted.
    pub fn request_orientation_permission(&mut self) -> bool {
        self.orientation.request_permission()
    }

    /// Moves a gain slider to `position` in `[0, 1]`.
    pub fn set_gain_position(&mut self, channel: GainChannel, position: f64) {
        let Some(value) = channel.range().to_value(position) else {
            warn!("Ignoring {:?} slider position {}", channel, position);
            return;
        };
        self.set_gain(channel, value);
    }

    /// Moves a gain slider by one step. Does nothing while the gain is unset.
    pub fn step_gain(&mut self, channel: GainChannel, up: bool) {
        let Some(position) = channel.position(&self.gains) else {
            debug!("{:?} unset, not stepping", channel);
            return;
        };
        let step = if up { GAIN_STEP } else { -GAIN_STEP };
        self.set_gain_position(channel, (position + step).clamp(0.0, 1.0));
    }

    /// Sets a gain value, clamped to its range, and transmits the pair if
    /// both gains are known. NaN is ignored.
    pub fn set_gain(&mut self, channel: GainChannel, value: f64) {
        if !channel.set(&mut self.gains, value) {
            return;
        }
        debug!("{:?} set to {:?}", channel, channel.get(&self.gains));
        let open = self.status.is_open();
        self.transmitter.send_gains(&mut self.link, open, &self.gains);
    }

    /// Inbound frame hook.
    ///
    /// Malformed frames are logged and leave the cache untouched.
    pub fn on_frame(&mut self, text: &str) {
        let telemetry = match decode_telemetry_frame(text) {
            Ok(telemetry) => telemetry,
            Err(e) => {
                warn!("Dropping malformed telemetry frame: {}", e);
                return;
            }
        };

        if let Some(robot_gains) = telemetry.config.filter(|gains| gains.complete().is_some()) {
            if self.gains.complete().is_none() {
                info!("Adopting robot gains {:?}", robot_gains);
                self.gains = robot_gains;
                self.transmitter.mark_gains_sent(robot_gains);
            }
        }

        self.telemetry = Some(telemetry);
    }

    /// Link lifecycle hook.
    pub fn on_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Open => {
                info!("Link open");
                self.status = LinkStatus::Open;
                self.transmitter.reset();
                self.arbitrate_and_send(None);
                let open = self.status.is_open();
                self.transmitter.send_gains(&mut self.link, open, &self.gains);
            }
            LinkEvent::Frame(text) => self.on_frame(&text),
            LinkEvent::Close => {
                info!("Link closed");
                self.status = LinkStatus::Disconnected;
                self.telemetry = None;
            }
            LinkEvent::Error(message) => {
                warn!("Link error: {}", message);
                self.status = LinkStatus::Failed(message);
            }
        }
    }

    fn update_command(&mut self) {
        self.arbitrate_and_send(None);
    }

    fn arbitrate_and_send(&mut self, state: Option<StateRequest>) {
        let samples = [
            self.pointer.sample(),
            self.keyboard.sample(),
            self.joystick.sample(),
            self.orientation.sample(),
        ];
        self.command = arbitrate(&samples, state);

        let open = self.status.is_open();
        self.transmitter.send_command(&mut self.link, open, &self.command);
    }
}
