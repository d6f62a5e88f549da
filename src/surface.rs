//! Orchestrator wiring gestures into the store and the transport.
//!
//! Thin by design: a committed gesture value flows to
//! `ConfigStore::set_knob_value` (persist) and then out as a CC frame via the
//! transport. One drag is active at a time, matching single-threaded UI event
//! delivery.

use tracing::debug;

use crate::error::ValidationError;
use crate::gesture::DragGesture;
use crate::midi::to_wire_value;
use crate::store::ConfigStore;
use crate::transport::Transport;

/// The control surface: document, transport, and the active drag.
pub struct ControlSurface {
    store: ConfigStore,
    transport: Transport,
    gesture: DragGesture,
    /// (rack id, knob id) under the active drag.
    active: Option<(u32, u32)>,
}

impl ControlSurface {
    pub fn new(store: ConfigStore, transport: Transport) -> Self {
        Self {
            store,
            transport,
            gesture: DragGesture::default(),
            active: None,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    /// Start a pointer drag on a knob, from its committed value.
    pub fn begin_pointer_drag(
        &mut self,
        rack_id: u32,
        knob_id: u32,
    ) -> Result<(), ValidationError> {
        let value = self.knob_value(rack_id, knob_id)?;
        self.gesture.begin_pointer(value);
        self.active = Some((rack_id, knob_id));
        Ok(())
    }

    /// Start a touch drag on a knob.
    pub fn begin_touch_drag(
        &mut self,
        rack_id: u32,
        knob_id: u32,
        y: f64,
    ) -> Result<(), ValidationError> {
        let value = self.knob_value(rack_id, knob_id)?;
        self.gesture.begin_touch(value, y);
        self.active = Some((rack_id, knob_id));
        Ok(())
    }

    /// Feed pointer motion into the active drag; commits and sends when the
    /// gesture emits a value.
    pub fn pointer_drag(&mut self, delta_y: f64) {
        if let Some(value) = self.gesture.pointer_move(delta_y) {
            self.commit_active(value);
        }
    }

    /// Feed a touch position into the active drag.
    pub fn touch_drag(&mut self, y: f64) {
        if let Some(value) = self.gesture.touch_move(y) {
            self.commit_active(value);
        }
    }

    /// Finish the active drag. Idempotent.
    pub fn end_drag(&mut self) {
        self.gesture.end();
        self.active = None;
    }

    /// Direct value commit outside a gesture (console `set` path): validate,
    /// persist, send.
    pub fn set_value(
        &mut self,
        rack_id: u32,
        knob_id: u32,
        value: f64,
    ) -> Result<(), ValidationError> {
        self.store.set_knob_value(rack_id, knob_id, value)?;
        self.send_knob(rack_id, knob_id);
        Ok(())
    }

    /// Re-send every knob's current value for one rack.
    pub fn send_all_rack(&mut self, rack_id: u32) -> Result<(), ValidationError> {
        let rack = self
            .store
            .document()
            .rack(rack_id)
            .ok_or(ValidationError::UnknownRack(rack_id))?;
        let channel = rack.channel;
        let frames: Vec<(u8, u8)> = rack
            .knobs
            .iter()
            .map(|k| (k.cc, to_wire_value(k.value)))
            .collect();
        for (cc, value) in frames {
            self.transport.send(channel - 1, cc, value);
        }
        Ok(())
    }

    /// Re-send every knob's current value for the whole document.
    pub fn send_all(&mut self) {
        let rack_ids: Vec<u32> = self.store.document().racks.iter().map(|r| r.id).collect();
        for rack_id in rack_ids {
            // Racks cannot vanish between the snapshot and the send
            let _ = self.send_all_rack(rack_id);
        }
    }

    fn knob_value(&self, rack_id: u32, knob_id: u32) -> Result<f64, ValidationError> {
        self.store
            .document()
            .rack(rack_id)
            .ok_or(ValidationError::UnknownRack(rack_id))?
            .knob(knob_id)
            .map(|k| k.value)
            .ok_or(ValidationError::UnknownKnob(rack_id, knob_id))
    }

    fn commit_active(&mut self, value: f64) {
        let Some((rack_id, knob_id)) = self.active else {
            return;
        };
        // The knob may have been removed mid-drag; drop the commit quietly
        if let Err(e) = self.store.set_knob_value(rack_id, knob_id, value) {
            debug!("Dropping gesture commit: {}", e);
            return;
        }
        self.send_knob(rack_id, knob_id);
    }

    fn send_knob(&mut self, rack_id: u32, knob_id: u32) {
        let Some(rack) = self.store.document().rack(rack_id) else {
            return;
        };
        let Some(knob) = rack.knob(knob_id) else {
            return;
        };
        let (channel, cc, wire) = (rack.channel, knob.cc, to_wire_value(knob.value));
        self.transport.send(channel - 1, cc, wire);
    }
}
