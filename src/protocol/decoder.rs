//! # Frame Decoder
//!
//! Parses inbound telemetry frames.

use super::frames::Telemetry;
use crate::error::{Result, TeleopError};

/// Decodes one inbound telemetry frame.
///
/// Missing or non-numeric telemetry values decode as `None`; only text that
/// is not a JSON object is rejected.
///
/// # Errors
///
/// - `Json`: the text is not valid JSON or a field has the wrong structure
/// - `Protocol`: the frame is valid JSON but not an object
pub fn decode_telemetry_frame(text: &str) -> Result<Telemetry> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(TeleopError::Protocol(format!(
            "Expected a telemetry object, got: {}",
            truncate(text, 64)
        )));
    }
    Ok(serde_json::from_value(value)?)
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
