//! Registration commands: adding and removing trackers, managing the allow
//! list.
//!
//! Every rejection here is a [`RegistrationError`] carrying the specific
//! reason, meant to be shown to whoever issued the command.

use std::sync::Arc;

use tracing::info;

use super::history::HistoryStore;
use super::notifier::EventNotifier;
use super::registry::{AllowList, ListenerRegistry};
use super::scrape::ScrapeExecutor;
use crate::domain::{Destination, EntityKey, EntityKind, GroupId};
use crate::error::{RegistrationError, StoreError};

/// A successful `add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub entity: EntityKey,
    /// Events recorded as already known when tracking started.
    pub seeded_events: usize,
    /// The group's previous destination for this entity, if it had one.
    pub replaced: Option<Destination>,
}

/// Result of an allow-list command. Both "already in that state" outcomes
/// are successes with a distinct status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowListChange {
    Added,
    AlreadyAllowed,
    Removed,
    NotAllowed,
}

/// One row of the `list` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSummary {
    pub entity: EntityKey,
    pub listeners: usize,
    pub history_len: usize,
}

/// Command surface consumed by the CLI or a chat integration.
pub struct Registrar {
    registry: Arc<ListenerRegistry>,
    history: Arc<HistoryStore>,
    allow_list: Arc<AllowList>,
    scraper: Arc<ScrapeExecutor>,
    notifier: Arc<EventNotifier>,
}

impl Registrar {
    pub fn new(
        registry: Arc<ListenerRegistry>,
        history: Arc<HistoryStore>,
        allow_list: Arc<AllowList>,
        scraper: Arc<ScrapeExecutor>,
        notifier: Arc<EventNotifier>,
    ) -> Self {
        Self {
            registry,
            history,
            allow_list,
            scraper,
            notifier,
        }
    }

    /// Start sending `group` notifications for the entity behind `link`.
    ///
    /// The entity is validated with an initial scrape and the destination
    /// with a test message. Everything the initial scrape sees is recorded
    /// as already known, so only later activity is notified.
    pub async fn add(
        &self,
        group: &GroupId,
        kind: EntityKind,
        link: &str,
        destination: Destination,
    ) -> Result<Registration, RegistrationError> {
        if !self.allow_list.is_allowed(group)? {
            return Err(RegistrationError::NotAuthorized);
        }

        let entity = EntityKey::from_link(kind, link)
            .ok_or_else(|| RegistrationError::InvalidLink(format!("no {kind} name in '{link}'")))?;

        let _guard = self.history.lock(&entity).await;

        let initial_events = self
            .scraper
            .scrape(&entity, Vec::new())
            .await
            .into_result()
            .map_err(|e| {
                RegistrationError::InvalidLink(format!("could not read activity for {entity}: {e}"))
            })?;

        let test_message = self.notifier.formatter().test_message();
        self.notifier
            .send(&destination, &test_message)
            .await
            .map_err(RegistrationError::InvalidDestination)?;

        // Seed before registering: the entity is only polled once it has a
        // listener, and by then its baseline is on disk.
        self.history.replace(&entity, &initial_events)?;
        let replaced = self.registry.register(&entity, group.clone(), destination)?;

        info!(
            entity = %entity,
            group = %group,
            seeded = initial_events.len(),
            "Tracker registered"
        );
        Ok(Registration {
            entity,
            seeded_events: initial_events.len(),
            replaced,
        })
    }

    /// Stop sending `group` notifications for the entity behind `link`.
    ///
    /// History is kept unless `purge_history` is set and no other group
    /// still tracks the entity.
    pub async fn remove(
        &self,
        group: &GroupId,
        kind: EntityKind,
        link: &str,
        purge_history: bool,
    ) -> Result<EntityKey, RegistrationError> {
        let entity = EntityKey::from_link(kind, link)
            .ok_or_else(|| RegistrationError::InvalidLink(format!("no {kind} name in '{link}'")))?;

        self.registry.unregister(&entity, group)?;

        if purge_history && self.registry.listeners_for(&entity)?.is_empty() {
            let _guard = self.history.lock(&entity).await;
            self.history.remove(&entity)?;
        }

        info!(entity = %entity, group = %group, "Tracker removed");
        Ok(entity)
    }

    pub fn allow(&self, group: &GroupId) -> Result<AllowListChange, StoreError> {
        if self.allow_list.allow(group)? {
            info!(group = %group, "Group allowed");
            Ok(AllowListChange::Added)
        } else {
            Ok(AllowListChange::AlreadyAllowed)
        }
    }

    pub fn disallow(&self, group: &GroupId) -> Result<AllowListChange, StoreError> {
        if self.allow_list.disallow(group)? {
            info!(group = %group, "Group disallowed");
            Ok(AllowListChange::Removed)
        } else {
            Ok(AllowListChange::NotAllowed)
        }
    }

    /// Tracked entities, optionally only those `group` is registered for.
    pub fn tracked(&self, group: Option<&GroupId>) -> Result<Vec<TrackedSummary>, StoreError> {
        let entities = match group {
            Some(group) => self.registry.entities_for_group(group)?,
            None => self.registry.tracked_entities()?,
        };

        entities
            .into_iter()
            .map(|entity| {
                Ok(TrackedSummary {
                    listeners: self.registry.listeners_for(&entity)?.len(),
                    history_len: self.history.load(&entity)?.len(),
                    entity,
                })
            })
            .collect()
    }

    /// Groups currently on the allow list.
    pub fn allowed_groups(&self) -> Result<Vec<GroupId>, StoreError> {
        self.allow_list.groups()
    }
}
