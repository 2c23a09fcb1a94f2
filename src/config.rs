//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all, see [`Config::load_or_default`]) yields a usable configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Result, TeleopError};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub link: LinkConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Robot link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    /// `host:port` (or `ws://` URL) of the robot's WebSocket endpoint
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// Input source configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Polling rate of the continuous sources (joystick) in Hz
    #[serde(default = "default_poll_rate_hz")]
    pub poll_rate_hz: u32,

    /// Explicit evdev device paths. Empty means auto-detect.
    #[serde(default)]
    pub device_paths: Vec<String>,

    #[serde(default = "default_stick_deadzone")]
    pub stick_deadzone: f32,

    /// Raw gamepad axis range
    #[serde(default = "default_axis_min")]
    pub axis_min: i32,

    #[serde(default = "default_axis_max")]
    pub axis_max: i32,

    /// evdev absolute axis code read as velocity (ABS_Y)
    #[serde(default = "default_vel_axis")]
    pub vel_axis: u16,

    /// evdev absolute axis code read as yaw (ABS_RX)
    #[serde(default = "default_yaw_axis")]
    pub yaw_axis: u16,

    /// Raw coordinate extent of touch surfaces
    #[serde(default = "default_touch_extent")]
    pub touch_extent_x: i32,

    #[serde(default = "default_touch_extent")]
    pub touch_extent_y: i32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files. Logs go to stdout when unset.
    #[serde(default)]
    pub dir: Option<String>,
}

// Default value functions
fn default_address() -> String { "127.0.0.1:8080".to_string() }
fn default_connect_timeout_ms() -> u64 { 2000 }

fn default_poll_rate_hz() -> u32 { 60 }
fn default_stick_deadzone() -> f32 { 0.05 }
fn default_axis_min() -> i32 { 0 }
fn default_axis_max() -> i32 { 255 }
fn default_vel_axis() -> u16 { 0x01 }
fn default_yaw_axis() -> u16 { 0x03 }
fn default_touch_extent() -> i32 { 4095 }

fn default_log_level() -> String { "info".to_string() }

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_rate_hz: default_poll_rate_hz(),
            device_paths: Vec::new(),
            stick_deadzone: default_stick_deadzone(),
            axis_min: default_axis_min(),
            axis_max: default_axis_max(),
            vel_axis: default_vel_axis(),
            yaw_axis: default_yaw_axis(),
            touch_extent_x: default_touch_extent(),
            touch_extent_y: default_touch_extent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> TeleopError {
    TeleopError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use botwheel_teleop::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.link.address.is_empty() {
            return Err(invalid("link address cannot be empty"));
        }

        if self.link.address.starts_with("wss://") {
            return Err(invalid("wss:// is not supported, use ws:// or host:port"));
        }

        if !self.link.address.contains(':') {
            return Err(invalid("link address must be host:port"));
        }

        if self.link.connect_timeout_ms == 0 || self.link.connect_timeout_ms > 60000 {
            return Err(invalid("connect_timeout_ms must be between 1 and 60000"));
        }

        if self.input.poll_rate_hz == 0 || self.input.poll_rate_hz > 1000 {
            return Err(invalid("poll_rate_hz must be between 1 and 1000"));
        }

        if !(0.0..=0.25).contains(&self.input.stick_deadzone) {
            return Err(invalid("stick_deadzone must be between 0.0 and 0.25"));
        }

        if self.input.axis_min >= self.input.axis_max {
            return Err(invalid("axis_min must be less than axis_max"));
        }

        if self.input.vel_axis == self.input.yaw_axis {
            return Err(invalid("vel_axis and yaw_axis must differ"));
        }

        if self.input.touch_extent_x <= 0 || self.input.touch_extent_y <= 0 {
            return Err(invalid("touch extents must be greater than 0"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid(format!(
                "log level '{}' must be one of: trace, debug, info, warn, error",
                self.logging.level
            )));
        }

        if matches!(&self.logging.dir, Some(dir) if dir.is_empty()) {
            return Err(invalid("logging dir cannot be empty when set"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let file = write_config(
            r#"
[link]
address = "192.168.4.1:8080"

[input]
poll_rate_hz = 30
device_paths = ["/dev/input/event3"]

[logging]
level = "debug"
"#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.link.address, "192.168.4.1:8080");
        assert_eq!(config.input.poll_rate_hz, 30);
        assert_eq!(config.input.device_paths, vec!["/dev/input/event3".to_string()]);
        assert_eq!(config.logging.level, "debug");
        // Untouched fields keep their defaults
        assert_eq!(config.input.axis_max, 255);
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let file = write_config("");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.link.address, default_address());
        assert_eq!(config.input.vel_axis, 0x01);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = write_config("[input]\npoll_rate_hz = 0\n");
        assert!(matches!(Config::load(file.path()), Err(TeleopError::Config(_))));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let file = write_config("[link\naddress = ");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/botwheel.toml").unwrap();
        assert_eq!(config.link.address, "127.0.0.1:8080");
    }

    #[test]
    fn test_empty_address() {
        let mut config = Config::default();
        config.link.address = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_address_without_port() {
        let mut config = Config::default();
        config.link.address = "robot.local".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_websocket_addresses() {
        let mut config = Config::default();
        config.link.address = "ws://192.168.4.1:8080/".to_string();
        assert!(config.validate().is_ok());

        config.link.address = "wss://robot.local:8443".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connect_timeout_bounds() {
        let mut config = Config::default();
        config.link.connect_timeout_ms = 0;
        assert!(config.validate().is_err());
        config.link.connect_timeout_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_rate_too_high() {
        let mut config = Config::default();
        config.input.poll_rate_hz = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stick_deadzone_bounds() {
        let mut config = Config::default();
        config.input.stick_deadzone = -0.1;
        assert!(config.validate().is_err());
        config.input.stick_deadzone = 0.3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_axis_range_inverted() {
        let mut config = Config::default();
        config.input.axis_min = 255;
        config.input.axis_max = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_vel_and_yaw_axis() {
        let mut config = Config::default();
        config.input.yaw_axis = config.input.vel_axis;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_touch_extent() {
        let mut config = Config::default();
        config.input.touch_extent_y = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir() {
        let mut config = Config::default();
        config.logging.dir = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_address(), "127.0.0.1:8080");
        assert_eq!(default_connect_timeout_ms(), 2000);
        assert_eq!(default_poll_rate_hz(), 60);
        assert_eq!(default_stick_deadzone(), 0.05);
        assert_eq!(default_axis_min(), 0);
        assert_eq!(default_axis_max(), 255);
        assert_eq!(default_touch_extent(), 4095);
        assert_eq!(default_log_level(), "info");
    }
}
