//! Device capability interface consumed by the transport.
//!
//! Mirrors the shape of the host MIDI API: request access once, then use the
//! granted handle to enumerate outputs and push bytes at one of them. The
//! transport never talks to midir directly; tests substitute a scripted
//! implementation.

use async_trait::async_trait;

use crate::error::AccessError;

/// Live state of an enumerated endpoint. An endpoint can be enumerated but
/// not connected (powered-off hardware keeps its port listed on some hosts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    Connected,
    Disconnected,
}

/// One discovered output endpoint. The id is transport-assigned, opaque, and
/// stable for the device's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    pub id: String,
    pub name: String,
    pub state: EndpointState,
}

/// Entry point of the capability: a one-shot access request.
#[async_trait]
pub trait OutputAccess: Send {
    /// Request access to the host's MIDI outputs. Requested at most once per
    /// session; both failure modes are terminal.
    async fn request(&mut self) -> Result<Box<dyn AccessHandle>, AccessError>;
}

/// Granted access: enumeration and fire-and-forget send.
pub trait AccessHandle: Send {
    /// Snapshot the current output list. Called again on every hot-plug
    /// notification.
    fn list_outputs(&mut self) -> Vec<EndpointInfo>;

    /// Push raw bytes at an endpoint. Best-effort: a `false` return means the
    /// bytes were dropped, which the transport treats as transient staleness,
    /// never as an error.
    fn send(&mut self, endpoint_id: &str, bytes: &[u8]) -> bool;
}
