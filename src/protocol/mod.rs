//! # Robot Link Protocol
//!
//! JSON frames exchanged with the robot, one object per message.
//!
//! This module handles:
//! - Outbound drive commands and gain updates
//! - Inbound telemetry frames with lenient numeric fields
//! - Decoding of ODrive fault bitmasks into symbolic names

pub mod decoder;
pub mod encoder;
pub mod faults;
pub mod frames;
