use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

use alto_tracker::adapter::outbound::store::MemoryStore;
use alto_tracker::error::StoreError;
use alto_tracker::port::{KeyValueStore, UpdateFn};
use serde_json::Value;

#[derive(Default)]
struct Faults {
    reads: HashSet<String>,
    writes: HashSet<String>,
}

/// In-memory store with per-key read and write failure injection.
#[derive(Clone, Default)]
pub struct FailingStore {
    inner: Arc<MemoryStore>,
    faults: Arc<Mutex<Faults>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read of `key` fail.
    pub fn fail_reads_of(&self, key: &str) {
        self.faults.lock().unwrap().reads.insert(key.to_string());
    }

    /// Make every write to `key` fail.
    pub fn fail_writes_to(&self, key: &str) {
        self.faults.lock().unwrap().writes.insert(key.to_string());
    }

    fn check(&self, key: &str, write: bool) -> Result<(), StoreError> {
        let faults = self.faults.lock().unwrap();
        let failing = if write { &faults.writes } else { &faults.reads };
        if failing.contains(key) {
            return Err(StoreError::Io {
                path: key.to_string(),
                source: io::Error::other("disk full"),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.check(key, false)?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.check(key, true)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.check(key, true)?;
        self.inner.remove(key)
    }

    fn update(&self, key: &str, apply: &mut UpdateFn<'_>) -> Result<(), StoreError> {
        self.check(key, false)?;
        self.check(key, true)?;
        self.inner.update(key, apply)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.inner.keys()
    }
}
