//! In-memory store implementation for testing.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::StoreError;
use crate::port::{KeyValueStore, UpdateFn};

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn update(&self, key: &str, apply: &mut UpdateFn<'_>) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        match apply(entries.get(key).cloned()) {
            Some(value) => {
                entries.insert(key.to_string(), value);
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        store.set("b", json!([1])).unwrap();
        store.set("a", json!({"x": 1})).unwrap();

        assert_eq!(store.get("b").unwrap(), Some(json!([1])));
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn update_sees_current_value_and_can_delete() {
        let store = MemoryStore::new();
        store.set("n", json!(1)).unwrap();

        let mut increment =
            |current: Option<Value>| current.map(|v| json!(v.as_i64().unwrap_or(0) + 1));
        store.update("n", &mut increment).unwrap();
        assert_eq!(store.get("n").unwrap(), Some(json!(2)));

        store.update("n", &mut |_: Option<Value>| None).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
