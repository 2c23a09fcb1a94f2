//! # Change-Detecting Transmitter
//!
//! Only sends what the robot does not already have.
//!
//! A command frame goes out when its velocity or yaw differs from the last
//! command actually sent, or when it carries a state request. A gain frame
//! goes out when either gain differs from the last pair sent, and always
//! carries both values. While the link is not open nothing is sent and the
//! "last sent" records stay as they were.

use tracing::{debug, trace, warn};

use crate::link::Link;
use crate::protocol::encoder::{encode_command_frame, encode_gains_frame};
use crate::protocol::frames::{Command, GainPair};

/// Last-sent records for both outbound frame kinds.
#[derive(Debug, Default)]
pub struct Transmitter {
    last_command: Option<(f64, f64)>,
    last_gains: Option<GainPair>,
}

impl Transmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything sent so far.
    ///
    /// Called when a new connection opens so the first frames always go out.
    pub fn reset(&mut self) {
        self.last_command = None;
        self.last_gains = None;
    }

    #[must_use]
    pub fn last_command(&self) -> Option<(f64, f64)> {
        self.last_command
    }

    #[must_use]
    pub fn last_gains(&self) -> Option<GainPair> {
        self.last_gains
    }

    /// Records gains as already known to the robot without sending them.
    pub fn mark_gains_sent(&mut self, gains: GainPair) {
        self.last_gains = Some(gains);
    }

    /// Sends `command` if it changed or carries a state request.
    ///
    /// Returns `true` if a frame was handed to the link.
    pub fn send_command(&mut self, link: &mut dyn Link, open: bool, command: &Command) -> bool {
        let motion = (command.vel, command.yaw);
        if command.state.is_none() && self.last_command == Some(motion) {
            return false;
        }
        if !open {
            trace!("Link not open, dropping command {:?}", command);
            return false;
        }

        let frame = match encode_command_frame(command) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode command: {}", e);
                return false;
            }
        };

        match link.send(frame) {
            Ok(()) => {
                debug!("Sent command vel={:.3} yaw={:.3} state={:?}", command.vel, command.yaw, command.state);
                self.last_command = Some(motion);
                true
            }
            Err(e) => {
                warn!("Failed to send command: {}", e);
                false
            }
        }
    }

    /// Sends `gains` if they differ from the last pair sent.
    ///
    /// Incomplete pairs are never sent. Returns `true` if a frame was handed
    /// to the link.
    pub fn send_gains(&mut self, link: &mut dyn Link, open: bool, gains: &GainPair) -> bool {
        if gains.complete().is_none() || self.last_gains.as_ref() == Some(gains) {
            return false;
        }
        if !open {
            trace!("Link not open, dropping gains {:?}", gains);
            return false;
        }

        let frame = match encode_gains_frame(gains) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode gains: {}", e);
                return false;
            }
        };

        match link.send(frame) {
            Ok(()) => {
                debug!("Sent gains {:?}", gains);
                self.last_gains = Some(*gains);
                true
            }
            Err(e) => {
                warn!("Failed to send gains: {}", e);
                false
            }
        }
    }
}
