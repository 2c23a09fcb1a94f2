//! # Robot Link Module
//!
//! The persistent bidirectional connection to the robot.
//!
//! The session only needs three things from a transport: a fire-and-forget
//! [`Link::send`], inbound frames, and the `Open` / `Close` / `Error`
//! lifecycle events, all delivered as [`LinkEvent`]s. Reconnecting is left
//! to whoever created the link.

pub mod ws;

use tokio::sync::mpsc;

use crate::error::{Result, TeleopError};

/// Outbound half of a link.
#[cfg_attr(test, mockall::automock)]
pub trait Link: Send {
    /// Queues one text frame for sending. Never blocks.
    fn send(&mut self, frame: String) -> Result<()>;
}

/// Events produced by a link transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Connection established; sending is allowed
    Open,
    /// One inbound text frame
    Frame(String),
    /// Connection closed
    Close,
    /// Transport failure
    Error(String),
}

/// Connection status shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkStatus {
    #[default]
    Disconnected,
    Connecting,
    Open,
    Failed(String),
}

impl LinkStatus {
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// [`Link`] backed by an unbounded channel drained by a transport task.
#[derive(Debug, Clone)]
pub struct ChannelLink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelLink {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }
}

impl Link for ChannelLink {
    fn send(&mut self, frame: String) -> Result<()> {
        self.tx
            .send(frame)
            .map_err(|_| TeleopError::Link("Transport task has stopped".to_string()))
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Link that records every frame it is asked to send.
    #[derive(Clone, Default)]
    pub struct RecordingLink {
        pub sent: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingLink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn frames(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }

        pub fn json_frames(&self) -> Vec<serde_json::Value> {
            self.frames()
                .iter()
                .map(|frame| serde_json::from_str(frame).unwrap())
                .collect()
        }

        pub fn clear(&self) {
            self.sent.lock().unwrap().clear();
        }
    }

    impl Link for RecordingLink {
        fn send(&mut self, frame: String) -> Result<()> {
            self.sent.lock().unwrap().push(frame);
            Ok(())
        }
    }
}
