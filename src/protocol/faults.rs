//! # ODrive Fault Flags
//!
//! Decodes the 32-bit fault bitmask reported by each motor controller.
//!
//! Known bits are looked up in [`FAULT_FLAGS`] in table order; every bit is
//! consumed at most once. Bits missing from the table are kept as a single
//! hexadecimal residual so that a firmware with new fault codes is never
//! shown as healthy.
//!
//! ```
//! use botwheel_teleop::protocol::faults::{describe_error, FaultReport};
//!
//! assert_eq!(describe_error(Some(0x21)), "INITIALIZING | DRV_FAULT");
//! assert_eq!(describe_error(Some(0)), "no error");
//! assert_eq!(describe_error(None), "unknown");
//!
//! let report = FaultReport::from_bits(0x8000_0001);
//! assert_eq!(report.to_string(), "INITIALIZING | 0x80000000");
//! assert_eq!(report.bits(), 0x8000_0001);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::TeleopError;

/// Rendered when the bitmask is zero.
pub const NO_ERROR: &str = "no error";

/// Rendered when no bitmask has been reported.
pub const UNKNOWN: &str = "unknown";

/// Separator between decoded tokens.
pub const SEPARATOR: &str = " | ";

/// Known fault bits in decode order.
pub const FAULT_FLAGS: &[(u32, &str)] = &[
    // Initialization
    (0x0000_0001, "INITIALIZING"),
    (0x0000_0002, "SYSTEM_LEVEL"),
    (0x0000_0004, "TIMING_ERROR"),
    (0x0000_0008, "MISSING_ESTIMATE"),
    (0x0000_0010, "BAD_CONFIG"),
    (0x0000_0020, "DRV_FAULT"),
    (0x0000_0040, "MISSING_INPUT"),
    // Bus voltage / current
    (0x0000_0100, "DC_BUS_OVER_VOLTAGE"),
    (0x0000_0200, "DC_BUS_UNDER_VOLTAGE"),
    (0x0000_0400, "DC_BUS_OVER_CURRENT"),
    (0x0000_0800, "DC_BUS_OVER_REGEN_CURRENT"),
    // Limits and thermal
    (0x0000_1000, "CURRENT_LIMIT_VIOLATION"),
    (0x0000_2000, "MOTOR_OVER_TEMP"),
    (0x0000_4000, "INVERTER_OVER_TEMP"),
    (0x0000_8000, "VELOCITY_LIMIT_VIOLATION"),
    (0x0001_0000, "POSITION_LIMIT_VIOLATION"),
    // Safety stops
    (0x0100_0000, "WATCHDOG_TIMER_EXPIRED"),
    (0x0200_0000, "ESTOP_REQUESTED"),
    (0x0400_0000, "SPINOUT_DETECTED"),
    (0x0800_0000, "BRAKE_RESISTOR_DISARMED"),
    (0x1000_0000, "THERMISTOR_DISCONNECTED"),
    (0x4000_0000, "CALIBRATION_ERROR"),
];

/// A decoded fault bitmask.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FaultReport {
    /// Names of the known bits that were set, in table order.
    pub flags: Vec<&'static str>,
    /// Set bits not present in the table.
    pub residual: u32,
}

impl FaultReport {
    /// Decodes a bitmask against [`FAULT_FLAGS`].
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        let mut remaining = bits;
        let mut flags = Vec::new();
        for &(mask, name) in FAULT_FLAGS {
            if remaining & mask != 0 {
                flags.push(name);
                remaining &= !mask;
            }
        }
        Self {
            flags,
            residual: remaining,
        }
    }

    /// Re-encodes the report into the original bitmask.
    #[must_use]
    pub fn bits(&self) -> u32 {
        self.flags
            .iter()
            .filter_map(|name| mask_of(name))
            .fold(self.residual, |bits, mask| bits | mask)
    }

    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.flags.is_empty() && self.residual == 0
    }
}

impl fmt::Display for FaultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clear() {
            return f.write_str(NO_ERROR);
        }

        let mut tokens: Vec<String> = self.flags.iter().map(|name| (*name).to_string()).collect();
        if self.residual != 0 {
            tokens.push(format!("0x{:X}", self.residual));
        }
        f.write_str(&tokens.join(SEPARATOR))
    }
}

impl FromStr for FaultReport {
    type Err = TeleopError;

    /// Parses the text produced by `Display` back into a report.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NO_ERROR {
            return Ok(Self::default());
        }

        let mut report = Self::default();
        for token in s.split(SEPARATOR) {
            if let Some(hex) = token.strip_prefix("0x") {
                let bits = u32::from_str_radix(hex, 16).map_err(|e| {
                    TeleopError::Protocol(format!("Bad residual fault token '{}': {}", token, e))
                })?;
                report.residual |= bits;
            } else {
                let &(_, name) = FAULT_FLAGS
                    .iter()
                    .find(|(_, name)| *name == token)
                    .ok_or_else(|| TeleopError::Protocol(format!("Unknown fault name '{}'", token)))?;
                report.flags.push(name);
            }
        }
        Ok(report)
    }
}

fn mask_of(name: &str) -> Option<u32> {
    FAULT_FLAGS
        .iter()
        .find(|(_, flag)| *flag == name)
        .map(|&(mask, _)| mask)
}

/// Renders an optional bitmask for display.
///
/// `None` gives [`UNKNOWN`], zero gives [`NO_ERROR`].
#[must_use]
pub fn describe_error(error: Option<u32>) -> String {
    match error {
        Some(bits) => FaultReport::from_bits(bits).to_string(),
        None => UNKNOWN.to_string(),
    }
}
