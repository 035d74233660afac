//! Durable preference store persisted as a single JSON file.
//!
//! The whole key-value map is loaded once at construction and rewritten on
//! every mutation. The `PreferenceStore` contract is infallible, so I/O
//! failures are logged and absorbed: the in-memory view stays authoritative
//! for the rest of the session and the next successful write repairs the
//! file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::ports::PreferenceStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PrefValue {
    Bool(bool),
    Int(i64),
    String(String),
}

/// File-backed `PreferenceStore` serialized with `serde_json`.
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    values: Mutex<HashMap<String, PrefValue>>,
}

impl JsonFilePreferenceStore {
    /// Opens the store at `path`, loading any existing contents.
    ///
    /// A missing file starts empty; an unreadable or corrupt file is logged
    /// and also starts empty (first-run defaults apply).
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = Self::load(&path);
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    fn load(path: &Path) -> HashMap<String, PrefValue> {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Preference file {} is corrupt, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read preference file {}: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    fn persist(&self, values: &HashMap<String, PrefValue>) {
        let json = match serde_json::to_string_pretty(values) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize preferences: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::error!("Failed to write preference file {}: {}", self.path.display(), e);
        }
    }

    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values
            .lock()
            .expect("JsonFilePreferenceStore: lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: PrefValue) {
        let mut values = self
            .values
            .lock()
            .expect("JsonFilePreferenceStore: lock poisoned");
        values.insert(key.to_string(), value);
        self.persist(&values);
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(PrefValue::Bool(value)) => Some(value),
            _ => None,
        }
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.set(key, PrefValue::Bool(value));
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(PrefValue::String(value)) => Some(value),
            _ => None,
        }
    }

    fn set_string(&self, key: &str, value: &str) {
        self.set(key, PrefValue::String(value.to_string()));
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(PrefValue::Int(value)) => Some(value),
            _ => None,
        }
    }

    fn set_int(&self, key: &str, value: i64) {
        self.set(key, PrefValue::Int(value));
    }

    fn remove(&self, key: &str) {
        let mut values = self
            .values
            .lock()
            .expect("JsonFilePreferenceStore: lock poisoned");
        if values.remove(key).is_some() {
            self.persist(&values);
        }
    }
}
