//! Error taxonomy for the control surface engine.
//!
//! Nothing here is allowed to escape the core as a panic: transport failures
//! become observable state, store failures are returned to the immediate
//! caller, and persistence failures degrade to defaults.

use thiserror::Error;

/// Failure modes of the device access request. Both are terminal for the
/// session: the transport reports them as state and never retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// The host environment lacks the MIDI output capability entirely.
    #[error("MIDI output is not supported on this system: {0}")]
    Unsupported(String),

    /// Access to the capability was refused by the user or OS.
    #[error("MIDI access denied: {0}")]
    Denied(String),
}

/// Rejection of an out-of-range or malformed input to a ConfigStore
/// operation. The operation is a no-op; the document is untouched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("channel {0} out of range (1-16)")]
    ChannelOutOfRange(i64),

    #[error("control number {0} out of range (0-127)")]
    ControlNumberOutOfRange(i64),

    #[error("value {0} out of range (0-1)")]
    ValueOutOfRange(f64),

    #[error("no rack with id {0}")]
    UnknownRack(u32),

    #[error("no knob with id {1} in rack {0}")]
    UnknownKnob(u32, u32),
}

/// Rejection of a bank import. Validation is all-or-nothing: any structural
/// problem leaves the current document unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("bank data must be a JSON array")]
    NotAnArray,

    #[error("bank {index}: {reason}")]
    InvalidBank { index: usize, reason: String },
}
