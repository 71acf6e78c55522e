//! Per-entity event history, the baseline for deduplication.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::{ActivityEvent, EntityKey, EventIdentity};
use crate::error::StoreError;
use crate::port::{KeyValueStore, TypedStoreExt};

/// Ordered, append-only record of the events observed for each entity.
///
/// Each entity's history is one value in the underlying store, so every
/// update replaces it in a single atomic write. No event identity key
/// appears twice in one history. A scrape-diff-notify-append sequence on one
/// entity must hold that entity's [`lock`](Self::lock).
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    locks: Mutex<HashMap<EntityKey, Arc<AsyncMutex<()>>>>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire exclusive access to `entity`'s history.
    ///
    /// Locks nobody holds or waits on are dropped from the map here, so
    /// entities that are no longer tracked do not accumulate.
    pub async fn lock(&self, entity: &EntityKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks.retain(|key, lock| key == entity || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(entity.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Events recorded for `entity`, oldest first. Empty if none.
    pub fn load(&self, entity: &EntityKey) -> Result<Vec<ActivityEvent>, StoreError> {
        Ok(self
            .store
            .get_as(&entity.to_string())?
            .unwrap_or_default())
    }

    /// Overwrite `entity`'s history, used when seeding a new registration.
    pub fn replace(&self, entity: &EntityKey, events: &[ActivityEvent]) -> Result<(), StoreError> {
        self.store.set_as(&entity.to_string(), &events)
    }

    /// Append `new_events` to `entity`'s history in one durable write.
    ///
    /// Events whose identity key is already recorded, or repeated earlier in
    /// `new_events`, are skipped. Returns how many were appended.
    pub fn append(
        &self,
        entity: &EntityKey,
        new_events: &[ActivityEvent],
    ) -> Result<usize, StoreError> {
        let mut appended = 0;
        self.store
            .update_as(&entity.to_string(), |history: Option<Vec<ActivityEvent>>| {
                let additions = unrecorded(history.as_deref().unwrap_or_default(), new_events);
                if additions.is_empty() {
                    return history;
                }
                appended = additions.len();
                let mut history = history.unwrap_or_default();
                history.extend(additions);
                Some(history)
            })?;
        Ok(appended)
    }

    /// Delete `entity`'s history. Returns whether any existed.
    pub fn remove(&self, entity: &EntityKey) -> Result<bool, StoreError> {
        self.store.remove(&entity.to_string())
    }
}

fn unrecorded(history: &[ActivityEvent], events: &[ActivityEvent]) -> Vec<ActivityEvent> {
    let mut seen: HashSet<EventIdentity<'_>> =
        history.iter().map(ActivityEvent::identity).collect();
    events
        .iter()
        .filter(|event| seen.insert(event.identity()))
        .cloned()
        .collect()
}
