//! Key/value persistence capability.
//!
//! The engine persists against a narrow string-keyed interface: the document
//! under one key, the selected output id under another. Failures are never
//! fatal; a slot that cannot be read or written behaves as if it were absent,
//! and the failure is logged.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Storage slot for the serialized rack document.
pub const KEY_RACKS: &str = "mididash-racks";

/// Storage slot for the selected MIDI output id.
pub const KEY_OUTPUT_ID: &str = "mididash-output-id";

/// String-keyed persistent storage. Implementations swallow I/O errors and
/// report absence instead.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Sled-backed storage, the production implementation.
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let db = sled::open(path.as_ref())?;
        debug!("Opened storage at {}", path.as_ref().display());
        Ok(Self { db })
    }
}

impl Storage for SledStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.db.get(key) {
            Ok(Some(bytes)) => match String::from_utf8(bytes.to_vec()) {
                Ok(s) => Some(s),
                Err(_) => {
                    warn!("Discarding non-UTF8 value for key '{}'", key);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Storage read failed for key '{}': {}", key, e);
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.db.insert(key, value.as_bytes()) {
            warn!("Storage write failed for key '{}': {}", key, e);
            return;
        }
        if let Err(e) = self.db.flush() {
            warn!("Storage flush failed: {}", e);
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.db.remove(key) {
            warn!("Storage remove failed for key '{}': {}", key, e);
        }
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default, Clone)]
pub struct MemoryStorage {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.lock().unwrap().remove(key);
    }
}
