//! ConfigStore: owns the rack/knob document and its persistence.
//!
//! Every mutating operation validates its input, applies the change to the
//! in-memory document, and writes the complete document to storage before
//! returning. There is no explicit save action and no partial persistence.

pub mod exchange;
pub mod types;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ImportError, ValidationError};
use crate::storage::{Storage, KEY_RACKS};
use self::exchange::Bank;
use self::types::{Document, Knob, Rack};

/// The source of truth for the rack/knob hierarchy.
pub struct ConfigStore {
    document: Document,
    storage: Arc<dyn Storage>,
}

impl ConfigStore {
    /// Load the document from storage, falling back to the seeded default
    /// when the slot is absent or holds malformed JSON. JSON that parses but
    /// breaks the data-model invariants is discarded the same way; nothing
    /// downstream re-checks ranges the store guarantees.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let document = match storage.get(KEY_RACKS) {
            Some(raw) => match serde_json::from_str::<Document>(&raw) {
                Ok(doc) if doc.is_valid() => doc,
                Ok(_) => {
                    warn!("Discarding stored document with out-of-range fields");
                    Document::seeded()
                }
                Err(e) => {
                    warn!("Discarding malformed stored document: {}", e);
                    Document::seeded()
                }
            },
            None => Document::seeded(),
        };

        Self { document, storage }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn persist(&self) {
        match serde_json::to_string(&self.document) {
            Ok(json) => self.storage.put(KEY_RACKS, &json),
            Err(e) => warn!("Failed to serialize document: {}", e),
        }
    }

    /// Add an empty rack. Returns the new rack's id.
    pub fn add_rack(&mut self) -> u32 {
        let id = self.document.next_rack_id();
        let name = format!("Rack {}", self.document.racks.len() + 1);
        self.document.racks.push(Rack {
            id,
            name,
            channel: 1,
            knobs: Vec::new(),
        });
        self.persist();
        debug!("Added rack {}", id);
        id
    }

    /// Remove a rack and all its knobs.
    pub fn remove_rack(&mut self, rack_id: u32) -> Result<(), ValidationError> {
        let before = self.document.racks.len();
        self.document.racks.retain(|r| r.id != rack_id);
        if self.document.racks.len() == before {
            return Err(ValidationError::UnknownRack(rack_id));
        }
        self.persist();
        debug!("Removed rack {}", rack_id);
        Ok(())
    }

    pub fn rename_rack(&mut self, rack_id: u32, name: &str) -> Result<(), ValidationError> {
        let rack = self
            .document
            .rack_mut(rack_id)
            .ok_or(ValidationError::UnknownRack(rack_id))?;
        rack.name = name.to_string();
        self.persist();
        Ok(())
    }

    /// Set a rack's channel. Out-of-range values are rejected, not clamped.
    pub fn set_channel(&mut self, rack_id: u32, channel: i64) -> Result<(), ValidationError> {
        if !(1..=16).contains(&channel) {
            return Err(ValidationError::ChannelOutOfRange(channel));
        }
        let rack = self
            .document
            .rack_mut(rack_id)
            .ok_or(ValidationError::UnknownRack(rack_id))?;
        rack.channel = channel as u8;
        self.persist();
        Ok(())
    }

    /// Add a knob with default label and CC number. Returns the knob's id.
    pub fn add_knob(&mut self, rack_id: u32) -> Result<u32, ValidationError> {
        let rack = self
            .document
            .rack_mut(rack_id)
            .ok_or(ValidationError::UnknownRack(rack_id))?;
        let id = rack.next_knob_id();
        let count = rack.knobs.len() as u32;
        rack.knobs.push(Knob {
            id,
            label: format!("Knob {}", count + 1),
            cc: (count + 1).min(127) as u8,
            value: 0.0,
        });
        self.persist();
        debug!("Added knob {} to rack {}", id, rack_id);
        Ok(id)
    }

    pub fn remove_knob(&mut self, rack_id: u32, knob_id: u32) -> Result<(), ValidationError> {
        let rack = self
            .document
            .rack_mut(rack_id)
            .ok_or(ValidationError::UnknownRack(rack_id))?;
        let before = rack.knobs.len();
        rack.knobs.retain(|k| k.id != knob_id);
        if rack.knobs.len() == before {
            return Err(ValidationError::UnknownKnob(rack_id, knob_id));
        }
        self.persist();
        Ok(())
    }

    pub fn set_knob_label(
        &mut self,
        rack_id: u32,
        knob_id: u32,
        label: &str,
    ) -> Result<(), ValidationError> {
        let knob = self.knob_mut(rack_id, knob_id)?;
        knob.label = label.to_string();
        self.persist();
        Ok(())
    }

    pub fn set_knob_cc(
        &mut self,
        rack_id: u32,
        knob_id: u32,
        cc: i64,
    ) -> Result<(), ValidationError> {
        if !(0..=127).contains(&cc) {
            return Err(ValidationError::ControlNumberOutOfRange(cc));
        }
        let knob = self.knob_mut(rack_id, knob_id)?;
        knob.cc = cc as u8;
        self.persist();
        Ok(())
    }

    /// The gesture-driven path: commit a new normalized value.
    pub fn set_knob_value(
        &mut self,
        rack_id: u32,
        knob_id: u32,
        value: f64,
    ) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::ValueOutOfRange(value));
        }
        let knob = self.knob_mut(rack_id, knob_id)?;
        knob.value = value;
        self.persist();
        Ok(())
    }

    fn knob_mut(&mut self, rack_id: u32, knob_id: u32) -> Result<&mut Knob, ValidationError> {
        self.document
            .rack_mut(rack_id)
            .ok_or(ValidationError::UnknownRack(rack_id))?
            .knob_mut(knob_id)
            .ok_or(ValidationError::UnknownKnob(rack_id, knob_id))
    }

    /// Export the document in exchange form.
    pub fn export_banks(&self) -> Vec<Bank> {
        exchange::export_banks(&self.document)
    }

    /// Export the document as pretty-printed exchange JSON.
    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(&self.export_banks()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Suggested file name for an export of this document.
    pub fn export_filename(&self) -> String {
        exchange::export_filename(&self.document)
    }

    /// Replace the entire document with an imported batch of banks.
    ///
    /// Validation is all-or-nothing: on any error the current document is
    /// left byte-identical. On success all knob values are reset to zero and
    /// the replacement is persisted immediately.
    pub fn import_banks(&mut self, raw: &str) -> Result<(), ImportError> {
        let document = exchange::parse_banks(raw)?;
        self.document = document;
        self.persist();
        debug!("Imported {} rack(s)", self.document.racks.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> ConfigStore {
        ConfigStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_fresh_store_is_seeded() {
        let store = store();
        let doc = store.document();
        assert_eq!(doc.racks.len(), 1);
        assert_eq!(doc.racks[0].knobs.len(), 10);
        assert!(doc.racks[0].knobs.iter().all(|k| k.value == 0.0));
    }

    #[test]
    fn test_malformed_stored_document_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put(KEY_RACKS, "{not json");
        let store = ConfigStore::new(storage);
        assert_eq!(store.document().racks.len(), 1);
    }

    #[test]
    fn test_stored_document_with_invalid_fields_discarded() {
        // Parses fine, but channel 0 breaks the 1-16 invariant
        let storage = Arc::new(MemoryStorage::new());
        storage.put(
            KEY_RACKS,
            r#"[{"id": 0, "name": "Bad", "channel": 0, "knobs": []}]"#,
        );
        let store = ConfigStore::new(storage);
        assert_eq!(store.document(), &Document::seeded());

        // Same for an out-of-range knob value
        let storage = Arc::new(MemoryStorage::new());
        storage.put(
            KEY_RACKS,
            r#"[{"id": 0, "name": "Bad", "channel": 1,
                 "knobs": [{"id": 0, "label": "k", "cc": 1, "value": 2.0}]}]"#,
        );
        let store = ConfigStore::new(storage);
        assert_eq!(store.document(), &Document::seeded());
    }

    #[test]
    fn test_mutations_persist_immediately() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = ConfigStore::new(storage.clone());
        store.set_knob_value(0, 3, 0.5).unwrap();

        // A second store over the same storage sees the committed value
        let reloaded = ConfigStore::new(storage);
        assert_eq!(reloaded.document().racks[0].knob(3).unwrap().value, 0.5);
    }

    #[test]
    fn test_add_rack_assigns_fresh_id() {
        let mut store = store();
        assert_eq!(store.add_rack(), 1);
        assert_eq!(store.add_rack(), 2);
        store.remove_rack(1).unwrap();
        // Still max existing + 1, not a reuse of the freed id
        assert_eq!(store.add_rack(), 3);
    }

    #[test]
    fn test_new_rack_is_empty_on_channel_1() {
        let mut store = store();
        let id = store.add_rack();
        let rack = store.document().rack(id).unwrap();
        assert!(rack.knobs.is_empty());
        assert_eq!(rack.channel, 1);
        assert_eq!(rack.name, "Rack 2");
    }

    #[test]
    fn test_remove_rack_cascades() {
        let mut store = store();
        store.remove_rack(0).unwrap();
        assert!(store.document().racks.is_empty());
        assert_eq!(store.remove_rack(0), Err(ValidationError::UnknownRack(0)));
    }

    #[test]
    fn test_set_channel_rejects_out_of_range() {
        let mut store = store();
        assert_eq!(
            store.set_channel(0, 0),
            Err(ValidationError::ChannelOutOfRange(0))
        );
        assert_eq!(
            store.set_channel(0, 17),
            Err(ValidationError::ChannelOutOfRange(17))
        );
        assert_eq!(store.document().racks[0].channel, 1);
        store.set_channel(0, 16).unwrap();
        assert_eq!(store.document().racks[0].channel, 16);
    }

    #[test]
    fn test_add_knob_defaults() {
        let mut store = store();
        let rack_id = store.add_rack();
        let knob_id = store.add_knob(rack_id).unwrap();
        let knob = store.document().rack(rack_id).unwrap().knob(knob_id).unwrap();
        assert_eq!(knob.id, 0);
        assert_eq!(knob.label, "Knob 1");
        assert_eq!(knob.cc, 1);
        assert_eq!(knob.value, 0.0);

        let second = store.add_knob(rack_id).unwrap();
        let knob = store.document().rack(rack_id).unwrap().knob(second).unwrap();
        assert_eq!(knob.label, "Knob 2");
        assert_eq!(knob.cc, 2);
    }

    #[test]
    fn test_knob_ids_unique_after_removal() {
        let mut store = store();
        // Seeded rack has knobs 0..9; removing 5 must not let a new knob collide
        store.remove_knob(0, 5).unwrap();
        let id = store.add_knob(0).unwrap();
        assert_eq!(id, 10);
        let rack = store.document().rack(0).unwrap();
        let mut ids: Vec<u32> = rack.knobs.iter().map(|k| k.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), rack.knobs.len());
    }

    #[test]
    fn test_set_knob_cc_rejects_out_of_range() {
        let mut store = store();
        assert_eq!(
            store.set_knob_cc(0, 3, 200),
            Err(ValidationError::ControlNumberOutOfRange(200))
        );
        // Knob unchanged
        assert_eq!(store.document().racks[0].knob(3).unwrap().cc, 4);
        store.set_knob_cc(0, 3, 0).unwrap();
        assert_eq!(store.document().racks[0].knob(3).unwrap().cc, 0);
    }

    #[test]
    fn test_set_knob_value_rejects_out_of_range() {
        let mut store = store();
        assert!(store.set_knob_value(0, 0, -0.01).is_err());
        assert!(store.set_knob_value(0, 0, 1.01).is_err());
        assert!(store.set_knob_value(0, 0, f64::NAN).is_err());
        assert_eq!(store.document().racks[0].knob(0).unwrap().value, 0.0);
    }

    #[test]
    fn test_import_replaces_document() {
        let mut store = store();
        let raw = r#"[{"name": "Imported", "channel": 5, "controls": [{"cc": 20, "name": "cutoff"}]}]"#;
        store.import_banks(raw).unwrap();
        let doc = store.document();
        assert_eq!(doc.racks.len(), 1);
        assert_eq!(doc.racks[0].name, "Imported");
        assert_eq!(doc.racks[0].channel, 5);
        assert_eq!(doc.racks[0].knobs[0].cc, 20);
    }

    #[test]
    fn test_import_atomicity() {
        let mut store = store();
        store.set_knob_value(0, 3, 0.5).unwrap();
        let before = store.document().clone();

        let raw = r#"[
            {"name": "A", "channel": 1, "controls": []},
            {"name": "B", "channel": "nope", "controls": []},
            {"name": "C", "channel": 3, "controls": []}
        ]"#;
        assert!(store.import_banks(raw).is_err());
        assert_eq!(store.document(), &before);
    }

    #[test]
    fn test_export_import_roundtrip_via_store() {
        let mut store = store();
        store.rename_rack(0, "Live Set").unwrap();
        store.set_knob_value(0, 2, 0.8).unwrap();
        let json = store.export_json();

        let mut other = self::store();
        other.import_banks(&json).unwrap();
        let doc = other.document();
        assert_eq!(doc.racks[0].name, "Live Set");
        assert_eq!(doc.racks[0].knobs.len(), 10);
        assert!(doc.racks[0].knobs.iter().all(|k| k.value == 0.0));
        assert_eq!(other.export_filename(), "Live_Set.json");
    }
}
