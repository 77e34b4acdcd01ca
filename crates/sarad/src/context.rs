//! Conversation context store.
//!
//! One slot map shared across turns: "CSE HOD kaun hai" followed by
//! "placements?" inherits the college from the earlier turn. Single
//! context per deployment - this is a single-user assistant.
//!
//! Persisted wholesale to a JSON file on every write; a missing or
//! corrupt file loads as an empty context, never an error.

use sara_common::SlotSet;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Slot names worth remembering between turns.
const REMEMBERED_KEYS: [&str; 3] = ["college", "department", "year"];

/// Explicitly constructed context handle. Read-merge-write runs under one
/// mutex scope so concurrent hosts cannot lose updates.
pub struct ContextStore {
    path: PathBuf,
    slots: Mutex<BTreeMap<String, String>>,
}

impl ContextStore {
    /// Load stored context from `path`, starting empty if absent or corrupt.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let slots = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Context file corrupt, starting empty: {}", e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self {
            path,
            slots: Mutex::new(slots),
        }
    }

    /// Copy stored values into slots that are missing or empty.
    /// Explicit slot values are never overwritten.
    pub fn merge_into(&self, slots: &mut SlotSet) {
        let stored = self.slots.lock().expect("context lock poisoned");
        for (key, value) in stored.iter() {
            if !slots.is_filled(key) {
                slots.set(key.clone(), value.clone());
            }
        }
    }

    /// Remember the slots of a completed resolution and persist.
    pub fn remember(&self, slots: &SlotSet) {
        let mut stored = self.slots.lock().expect("context lock poisoned");
        for (key, value) in slots.iter() {
            if REMEMBERED_KEYS.contains(&key) && !value.is_empty() {
                stored.insert(key.to_string(), value.to_string());
            }
        }

        // Overwritten wholesale; a failed write only costs cross-restart recall
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&*stored) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    warn!("Failed to persist context: {}", e);
                } else {
                    debug!("Context persisted ({} slots)", stored.len());
                }
            }
            Err(e) => warn!("Failed to serialize context: {}", e),
        }
    }

    /// Current stored slots (for tests and status output).
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.slots.lock().expect("context lock poisoned").clone()
    }
}
