//! Output transport: endpoint discovery, selection, and fire-and-forget send.
//!
//! The transport is a small state machine over the device capability:
//!
//! ```text
//! Uninitialized -> Requesting -> { Ready, Denied }
//!                                   |
//! Unsupported (host lacks the capability entirely)
//! ```
//!
//! `Ready` re-enters itself on every enumeration change; the reconciliation
//! rule guarantees the selection never dangles. Unsupported and denied are
//! terminal for the session and surface as observable state, never as errors
//! thrown past this boundary.

pub mod capability;
pub mod midir_backend;

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::AccessError;
use crate::midi::{format_hex, ControlChange};
use crate::storage::{Storage, KEY_OUTPUT_ID};
use self::capability::{AccessHandle, EndpointInfo, EndpointState, OutputAccess};

/// Lifecycle of the transport's access to the device capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Uninitialized,
    Requesting,
    Ready,
    Denied,
    Unsupported,
}

/// Owns the live endpoint enumeration and the persisted selection.
pub struct Transport {
    access: Box<dyn OutputAccess>,
    handle: Option<Box<dyn AccessHandle>>,
    state: TransportState,
    /// User-facing banner text for terminal failures.
    error: Option<String>,
    outputs: Vec<EndpointInfo>,
    selected: Option<String>,
    storage: Arc<dyn Storage>,
}

impl Transport {
    /// Create a transport over a capability, restoring any persisted
    /// endpoint selection. Validity of the restored id is only checked
    /// against the first enumeration.
    pub fn new(access: Box<dyn OutputAccess>, storage: Arc<dyn Storage>) -> Self {
        let selected = storage.get(KEY_OUTPUT_ID);
        Self {
            access,
            handle: None,
            state: TransportState::Uninitialized,
            error: None,
            outputs: Vec::new(),
            selected,
            storage,
        }
    }

    /// Request capability access. At most one request per session: calls
    /// after the first are no-ops regardless of outcome.
    pub async fn initialize(&mut self) {
        if self.state != TransportState::Uninitialized {
            return;
        }
        self.state = TransportState::Requesting;

        match self.access.request().await {
            Ok(handle) => {
                self.handle = Some(handle);
                self.state = TransportState::Ready;
                info!("MIDI output access granted");
                self.refresh_outputs();
            }
            Err(AccessError::Unsupported(reason)) => {
                self.state = TransportState::Unsupported;
                self.error = Some(AccessError::Unsupported(reason).to_string());
                info!("{}", self.error.as_deref().unwrap_or_default());
            }
            Err(AccessError::Denied(reason)) => {
                self.state = TransportState::Denied;
                self.error = Some(AccessError::Denied(reason).to_string());
                info!("{}", self.error.as_deref().unwrap_or_default());
            }
        }
    }

    /// Re-enumerate outputs and reconcile the selection. Runs on every
    /// hot-plug notification; idempotent when nothing changed.
    pub fn refresh_outputs(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        self.outputs = handle.list_outputs();

        if let Some(selected) = &self.selected {
            if !self.outputs.iter().any(|o| &o.id == selected) {
                info!("Selected output '{}' vanished, clearing selection", selected);
                self.selected = None;
                self.storage.remove(KEY_OUTPUT_ID);
            }
        }
    }

    /// The live endpoint list (read-only copy of transport-owned state).
    pub fn outputs(&self) -> &[EndpointInfo] {
        &self.outputs
    }

    /// Record and persist an endpoint selection. Existence is not checked
    /// here; the next enumeration reconciles.
    pub fn select_output(&mut self, id: &str) {
        self.selected = Some(id.to_string());
        self.storage.put(KEY_OUTPUT_ID, id);
        debug!("Selected output '{}'", id);
    }

    pub fn selected_output(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// True iff the selected endpoint is enumerated AND reports connected.
    pub fn is_connected(&self) -> bool {
        let Some(selected) = &self.selected else {
            return false;
        };
        self.outputs
            .iter()
            .any(|o| &o.id == selected && o.state == EndpointState::Connected)
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Banner text for terminal failures, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// One-line status for the UI/prompt.
    pub fn status(&self) -> &str {
        if self.error.is_some() {
            "Error"
        } else if self.is_connected() {
            "Connected"
        } else {
            "No output"
        }
    }

    /// Send one CC frame: wire channel (0-15), control number, 7-bit value.
    ///
    /// Silently dropped when access was never granted, nothing is selected,
    /// or the selected endpoint is no longer enumerated. Fire-and-forget
    /// otherwise: no ack, no retry, no queueing.
    pub fn send(&mut self, channel: u8, cc: u8, value: u8) {
        let Some(handle) = self.handle.as_mut() else {
            debug!("Dropping CC send: no MIDI access");
            return;
        };
        let Some(selected) = &self.selected else {
            debug!("Dropping CC send: no output selected");
            return;
        };
        if !self.outputs.iter().any(|o| &o.id == selected) {
            debug!("Dropping CC send: output '{}' not enumerated", selected);
            return;
        }

        let message = ControlChange {
            channel: channel & 0x0F,
            cc,
            value,
        };
        let frame = message.encode();
        if handle.send(selected, &frame) {
            debug!("Sent: {} | {}", format_hex(&frame), message);
        }
    }
}
