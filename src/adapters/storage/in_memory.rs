//! In-memory preference store for tests and ephemeral use.
//!
//! Deterministic and dependency-free; state is lost when the process exits.
//!
//! # Panics
//!
//! Methods may panic if the internal lock is poisoned. This is acceptable
//! for test code; durable deployments should use
//! [`JsonFilePreferenceStore`](super::JsonFilePreferenceStore).

use std::collections::HashMap;
use std::sync::RwLock;

use crate::ports::PreferenceStore;

#[derive(Debug, Clone, PartialEq)]
enum PrefValue {
    Bool(bool),
    Int(i64),
    String(String),
}

/// In-memory `PreferenceStore` backed by a `RwLock<HashMap>`.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: RwLock<HashMap<String, PrefValue>>,
}

impl InMemoryPreferenceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys (for test assertions).
    pub fn len(&self) -> usize {
        self.values
            .read()
            .expect("InMemoryPreferenceStore: lock poisoned")
            .len()
    }

    /// Returns true when no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values
            .read()
            .expect("InMemoryPreferenceStore: lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: PrefValue) {
        self.values
            .write()
            .expect("InMemoryPreferenceStore: lock poisoned")
            .insert(key.to_string(), value);
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
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
        self.values
            .write()
            .expect("InMemoryPreferenceStore: lock poisoned")
            .remove(key);
    }
}
