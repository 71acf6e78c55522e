//! Per-entity listener registry and the group allow list.
//!
//! Both are thin typed views over a [`KeyValueStore`]. Every mutation is a
//! single atomic [`update`](KeyValueStore::update) of one key, so concurrent
//! commands never drop each other's registrations. Readers always see the latest
//! persisted state, so a registration change becomes visible to the next
//! polling cycle.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{Destination, EntityKey, GroupId};
use crate::error::{RegistrationError, StoreError};
use crate::port::{KeyValueStore, TypedStoreExt};

/// Destinations registered for one entity, keyed by registering group.
pub type ListenerSet = BTreeMap<GroupId, Destination>;

/// One registered notification destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub group: GroupId,
    pub destination: Destination,
}

/// Which groups want notifications for which entities.
pub struct ListenerRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl ListenerRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Register `destination` for `group` on `entity`.
    ///
    /// Re-registering the same group replaces its destination. Returns the
    /// destination that was replaced, if any.
    pub fn register(
        &self,
        entity: &EntityKey,
        group: GroupId,
        destination: Destination,
    ) -> Result<Option<Destination>, StoreError> {
        let mut previous = None;
        let mut count = 0;
        self.store
            .update_as(&entity.to_string(), |listeners: Option<ListenerSet>| {
                let mut listeners = listeners.unwrap_or_default();
                previous = listeners.insert(group, destination);
                count = listeners.len();
                Some(listeners)
            })?;

        debug!(entity = %entity, listeners = count, "Listener registered");
        Ok(previous)
    }

    /// Remove `group`'s registration for `entity`.
    ///
    /// When the last listener goes, the entity leaves the registry and is no
    /// longer polled. Its history is untouched.
    pub fn unregister(&self, entity: &EntityKey, group: &GroupId) -> Result<(), RegistrationError> {
        let mut removed = false;
        let mut remaining = 0;
        self.store
            .update_as(&entity.to_string(), |listeners: Option<ListenerSet>| {
                let mut listeners = listeners?;
                removed = listeners.remove(group).is_some();
                remaining = listeners.len();
                (!listeners.is_empty()).then_some(listeners)
            })?;

        if !removed {
            return Err(RegistrationError::NotRegistered(entity.to_string()));
        }
        if remaining == 0 {
            debug!(entity = %entity, "Last listener removed, entity no longer tracked");
        }
        Ok(())
    }

    /// Snapshot of the listeners for `entity` at call time.
    pub fn listeners_for(&self, entity: &EntityKey) -> Result<Vec<Listener>, StoreError> {
        let listeners: ListenerSet = self.store.get_as(&entity.to_string())?.unwrap_or_default();
        Ok(listeners
            .into_iter()
            .map(|(group, destination)| Listener { group, destination })
            .collect())
    }

    /// Entities with at least one listener.
    pub fn tracked_entities(&self) -> Result<Vec<EntityKey>, StoreError> {
        let mut entities = Vec::new();
        for key in self.store.keys()? {
            let entity = match key.parse::<EntityKey>() {
                Ok(entity) => entity,
                Err(reason) => {
                    warn!(key = %key, reason = %reason, "Skipping malformed registry key");
                    continue;
                }
            };
            let listeners: ListenerSet = self.store.get_as(&key)?.unwrap_or_default();
            if !listeners.is_empty() {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    /// Entities `group` has registered a listener for.
    pub fn entities_for_group(&self, group: &GroupId) -> Result<Vec<EntityKey>, StoreError> {
        let mut entities = Vec::new();
        for entity in self.tracked_entities()? {
            let listeners: ListenerSet =
                self.store.get_as(&entity.to_string())?.unwrap_or_default();
            if listeners.contains_key(group) {
                entities.push(entity);
            }
        }
        Ok(entities)
    }
}

/// Groups permitted to register entities.
pub struct AllowList {
    store: Arc<dyn KeyValueStore>,
}

impl AllowList {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn is_allowed(&self, group: &GroupId) -> Result<bool, StoreError> {
        Ok(self.store.get(group.as_str())?.is_some())
    }

    /// Add `group`. Returns `false` if it was already allowed.
    pub fn allow(&self, group: &GroupId) -> Result<bool, StoreError> {
        let mut added = false;
        self.store
            .update(group.as_str(), &mut |current: Option<Value>| {
                added = current.is_none();
                Some(current.unwrap_or(Value::Bool(true)))
            })?;
        Ok(added)
    }

    /// Remove `group`. Returns `false` if it was not allowed.
    pub fn disallow(&self, group: &GroupId) -> Result<bool, StoreError> {
        self.store.remove(group.as_str())
    }

    pub fn groups(&self) -> Result<Vec<GroupId>, StoreError> {
        Ok(self.store.keys()?.into_iter().map(GroupId::new).collect())
    }
}
