//! Bank import/export: the portable exchange form of a rack.
//!
//! A bank deliberately omits knob values (imported knobs always reset to
//! zero) and re-indexes ids sequentially, so a bank file carries layout, not
//! live state. Validation on import is all-or-nothing across the batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{Document, Knob, Rack};
use crate::error::ImportError;

/// Exchange form of one knob: CC number and display name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankControl {
    pub cc: u8,
    pub name: String,
}

/// Exchange form of one rack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub name: String,
    pub channel: u8,
    pub controls: Vec<BankControl>,
}

/// Project the document into its exchange form, preserving rack and knob
/// order and dropping values and ids.
pub fn export_banks(doc: &Document) -> Vec<Bank> {
    doc.racks
        .iter()
        .map(|rack| Bank {
            name: rack.name.clone(),
            channel: rack.channel,
            controls: rack
                .knobs
                .iter()
                .map(|k| BankControl {
                    cc: k.cc,
                    name: k.label.clone(),
                })
                .collect(),
        })
        .collect()
}

/// Parse and validate raw bank JSON into a replacement document.
///
/// Every entry must carry a numeric `channel` and an array `controls`; if any
/// entry is structurally invalid the whole batch is rejected. Accepted banks
/// get their channel clamped to 1-16, ids re-assigned sequentially from 0,
/// and all knob values reset to 0.
pub fn parse_banks(raw: &str) -> Result<Document, ImportError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ImportError::Json(e.to_string()))?;
    let entries = value.as_array().ok_or(ImportError::NotAnArray)?;

    // Validate the whole batch before building anything
    for (index, entry) in entries.iter().enumerate() {
        if entry.get("channel").and_then(Value::as_f64).is_none() {
            return Err(ImportError::InvalidBank {
                index,
                reason: "missing or non-numeric 'channel'".to_string(),
            });
        }
        if entry.get("controls").and_then(Value::as_array).is_none() {
            return Err(ImportError::InvalidBank {
                index,
                reason: "missing or non-array 'controls'".to_string(),
            });
        }
    }

    let racks = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let channel = entry
                .get("channel")
                .and_then(Value::as_f64)
                .unwrap_or(1.0)
                .round()
                .clamp(1.0, 16.0) as u8;

            let controls = entry
                .get("controls")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            let knobs = controls
                .iter()
                .enumerate()
                .map(|(i, control)| Knob {
                    id: i as u32,
                    label: control
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string(),
                    cc: control
                        .get("cc")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0)
                        .round()
                        .clamp(0.0, 127.0) as u8,
                    value: 0.0,
                })
                .collect();

            Rack {
                id: index as u32,
                name: entry
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                channel,
                knobs,
            }
        })
        .collect();

    Ok(Document { racks })
}

/// File name for an exported bank file, derived from the first rack's name
/// with anything outside `[A-Za-z0-9_-]` replaced by underscores.
pub fn export_filename(doc: &Document) -> String {
    let base = doc
        .racks
        .first()
        .map(|r| r.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("banks");

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{}.json", sanitized)
}
