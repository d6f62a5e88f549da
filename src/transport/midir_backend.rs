//! midir-backed implementation of the output capability.
//!
//! Enumeration opens a throwaway client per call (midir has no change
//! callback, so the host polls); sends hold one open connection to the most
//! recently used endpoint and reconnect when the target changes.

use async_trait::async_trait;
use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, warn};

use super::capability::{AccessHandle, EndpointInfo, EndpointState, OutputAccess};
use crate::error::AccessError;

const CLIENT_NAME: &str = "Mididash";

/// Production access: creating a midir client is the whole request, so the
/// only failure mode is an unsupported host (no MIDI subsystem).
pub struct MidirAccess;

#[async_trait]
impl OutputAccess for MidirAccess {
    async fn request(&mut self) -> Result<Box<dyn AccessHandle>, AccessError> {
        match MidiOutput::new(CLIENT_NAME) {
            Ok(_) => Ok(Box::new(MidirHandle { conn: None })),
            Err(e) => Err(AccessError::Unsupported(e.to_string())),
        }
    }
}

/// Granted handle holding at most one open output connection.
pub struct MidirHandle {
    conn: Option<(String, MidiOutputConnection)>,
}

impl MidirHandle {
    fn connect(&mut self, endpoint_id: &str) -> bool {
        let out = match MidiOutput::new(CLIENT_NAME) {
            Ok(out) => out,
            Err(e) => {
                warn!("Failed to create MIDI output client: {}", e);
                return false;
            }
        };

        let Some(port) = out.ports().into_iter().find(|p| p.id() == endpoint_id) else {
            debug!("Output port '{}' no longer present", endpoint_id);
            return false;
        };

        match out.connect(&port, CLIENT_NAME) {
            Ok(conn) => {
                self.conn = Some((endpoint_id.to_string(), conn));
                true
            }
            Err(e) => {
                warn!("Failed to connect to output port: {}", e);
                false
            }
        }
    }
}

impl AccessHandle for MidirHandle {
    fn list_outputs(&mut self) -> Vec<EndpointInfo> {
        let out = match MidiOutput::new(CLIENT_NAME) {
            Ok(out) => out,
            Err(e) => {
                warn!("Failed to enumerate MIDI outputs: {}", e);
                return Vec::new();
            }
        };

        out.ports()
            .iter()
            .map(|port| EndpointInfo {
                id: port.id(),
                name: out
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Output {}", port.id())),
                // midir only enumerates ports that are actually reachable
                state: EndpointState::Connected,
            })
            .collect()
    }

    fn send(&mut self, endpoint_id: &str, bytes: &[u8]) -> bool {
        let connected = match &self.conn {
            Some((id, _)) if id == endpoint_id => true,
            _ => self.connect(endpoint_id),
        };
        if !connected {
            return false;
        }

        if let Some((_, conn)) = &mut self.conn {
            if let Err(e) = conn.send(bytes) {
                warn!("MIDI send failed: {}", e);
                // Drop the stale connection; the next send reconnects
                self.conn = None;
                return false;
            }
            return true;
        }
        false
    }
}
