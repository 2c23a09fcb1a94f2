//! # Error Types
//!
//! Custom error types for BotWheel Teleop using `thiserror`.

use thiserror::Error;

/// Main error type for BotWheel Teleop
#[derive(Debug, Error)]
pub enum TeleopError {
    /// Wire protocol errors (unexpected frame shape)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Frame could not be parsed as JSON
    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Link transport errors
    #[error("Link error: {0}")]
    Link(String),

    /// Input device errors
    #[error("Input device error: {0}")]
    Device(String),

    /// No usable input device was found
    #[error("No input devices found")]
    DeviceNotFound,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for BotWheel Teleop
pub type Result<T> = std::result::Result<T, TeleopError>;
