//! MIDI wire encoding for the control surface.
//!
//! The surface only ever emits Control Change messages, so this module is a
//! small codec: normalized knob position to 7-bit value, and channel/CC pair
//! to a 3-byte frame.

use std::fmt;

/// A Control Change message: channel (0-15 on the wire), controller number
/// (0-127), value (0-127).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    pub channel: u8,
    pub cc: u8,
    pub value: u8,
}

impl ControlChange {
    /// Encode to the 3-byte wire frame.
    ///
    /// Data bytes are clamped into the 7-bit range; callers are expected to
    /// hand over already-validated values, and encoding never fails.
    pub fn encode(&self) -> [u8; 3] {
        [
            0xB0 | (self.channel & 0x0F),
            self.cc.min(0x7F),
            self.value.min(0x7F),
        ]
    }
}

impl fmt::Display for ControlChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Channels are 1-16 user-facing
        write!(f, "CC ch:{} cc:{} v:{}", self.channel + 1, self.cc, self.value)
    }
}

/// Convert a normalized knob position in [0,1] to a 7-bit wire value.
///
/// Monotonic, with `to_wire_value(0.0) == 0` and `to_wire_value(1.0) == 127`.
pub fn to_wire_value(value: f64) -> u8 {
    (value * 127.0).round() as u8
}

/// Format MIDI bytes as a hex string for logging.
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
