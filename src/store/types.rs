//! Document type definitions: racks of knobs.
//!
//! The document is the unit of persistence. Racks own their knobs
//! exclusively; knobs are value-like records found by id search, never by
//! reference, and carry no back-pointer to their rack.

use serde::{Deserialize, Serialize};

/// Number of knobs seeded into a freshly initialized document.
pub const DEFAULT_KNOB_COUNT: usize = 10;

/// A single continuous control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Knob {
    /// Unique within the owning rack.
    pub id: u32,
    pub label: String,
    /// Control Change number (0-127).
    pub cc: u8,
    /// Normalized position in [0,1].
    pub value: f64,
}

/// A named group of knobs bound to one MIDI channel (1-16 user-facing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rack {
    /// Unique within the document.
    pub id: u32,
    pub name: String,
    pub channel: u8,
    pub knobs: Vec<Knob>,
}

impl Rack {
    pub fn knob(&self, knob_id: u32) -> Option<&Knob> {
        self.knobs.iter().find(|k| k.id == knob_id)
    }

    pub fn knob_mut(&mut self, knob_id: u32) -> Option<&mut Knob> {
        self.knobs.iter_mut().find(|k| k.id == knob_id)
    }

    /// Fresh knob id: max existing + 1, or 0 for an empty rack.
    pub fn next_knob_id(&self) -> u32 {
        self.knobs.iter().map(|k| k.id + 1).max().unwrap_or(0)
    }
}

/// The ordered sequence of all racks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub racks: Vec<Rack>,
}

impl Document {
    /// An empty document (legal, but not what a fresh session starts with).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The fresh-session document: one rack on channel 1 with ten knobs
    /// labeled "Knob 1".."Knob 10" on CC 1..10, all at zero.
    pub fn seeded() -> Self {
        let knobs = (0..DEFAULT_KNOB_COUNT as u32)
            .map(|i| Knob {
                id: i,
                label: format!("Knob {}", i + 1),
                cc: (i + 1) as u8,
                value: 0.0,
            })
            .collect();

        Self {
            racks: vec![Rack {
                id: 0,
                name: "Rack 1".to_string(),
                channel: 1,
                knobs,
            }],
        }
    }

    pub fn rack(&self, rack_id: u32) -> Option<&Rack> {
        self.racks.iter().find(|r| r.id == rack_id)
    }

    pub fn rack_mut(&mut self, rack_id: u32) -> Option<&mut Rack> {
        self.racks.iter_mut().find(|r| r.id == rack_id)
    }

    /// Fresh rack id: max existing + 1, or 0 for an empty document.
    pub fn next_rack_id(&self) -> u32 {
        self.racks.iter().map(|r| r.id + 1).max().unwrap_or(0)
    }

    /// Check the data-model invariants: channels in 1-16, CC numbers 7-bit,
    /// values normalized, ids unique within their container. A stored
    /// document that parses but fails this check is as malformed as bad
    /// JSON and gets discarded on load.
    pub fn is_valid(&self) -> bool {
        let mut rack_ids = Vec::with_capacity(self.racks.len());
        for rack in &self.racks {
            if !(1..=16).contains(&rack.channel) || rack_ids.contains(&rack.id) {
                return false;
            }
            rack_ids.push(rack.id);

            let mut knob_ids = Vec::with_capacity(rack.knobs.len());
            for knob in &rack.knobs {
                if knob.cc > 127
                    || !(0.0..=1.0).contains(&knob.value)
                    || knob_ids.contains(&knob.id)
                {
                    return false;
                }
                knob_ids.push(knob.id);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_document_shape() {
        let doc = Document::seeded();
        assert_eq!(doc.racks.len(), 1);
        let rack = &doc.racks[0];
        assert_eq!(rack.channel, 1);
        assert_eq!(rack.knobs.len(), 10);
        for (i, knob) in rack.knobs.iter().enumerate() {
            assert_eq!(knob.cc as usize, i + 1);
            assert_eq!(knob.label, format!("Knob {}", i + 1));
            assert_eq!(knob.value, 0.0);
        }
    }

    #[test]
    fn test_next_ids() {
        let mut doc = Document::empty();
        assert_eq!(doc.next_rack_id(), 0);
        doc = Document::seeded();
        assert_eq!(doc.next_rack_id(), 1);
        assert_eq!(doc.racks[0].next_knob_id(), 10);
    }

    #[test]
    fn test_is_valid_accepts_seeded_and_empty() {
        assert!(Document::seeded().is_valid());
        assert!(Document::empty().is_valid());
    }

    #[test]
    fn test_is_valid_rejects_invariant_violations() {
        let mut doc = Document::seeded();
        doc.racks[0].channel = 0;
        assert!(!doc.is_valid());

        let mut doc = Document::seeded();
        doc.racks[0].channel = 17;
        assert!(!doc.is_valid());

        let mut doc = Document::seeded();
        doc.racks[0].knobs[0].cc = 128;
        assert!(!doc.is_valid());

        let mut doc = Document::seeded();
        doc.racks[0].knobs[0].value = 1.5;
        assert!(!doc.is_valid());

        let mut doc = Document::seeded();
        doc.racks[0].knobs[1].id = 0;
        assert!(!doc.is_valid());

        let mut doc = Document::seeded();
        doc.racks.push(doc.racks[0].clone());
        assert!(!doc.is_valid());
    }

    #[test]
    fn test_document_serializes_as_array() {
        let json = serde_json::to_string(&Document::empty()).unwrap();
        assert_eq!(json, "[]");
    }
}
