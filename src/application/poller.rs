//! Periodic polling of every tracked entity.
//!
//! # Cycle
//!
//! ```text
//! tick ──► snapshot tracked entities
//!            │ (up to N entities concurrently)
//!            ├── lock entity history
//!            ├── scrape (blocking pool) ──► failure: log, alert, skip entity
//!            ├── diff against history
//!            ├── notify listeners
//!            └── append to history (one atomic write)
//! ```
//!
//! No failure for one entity affects any other entity, and no failure ends
//! the polling loop.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::blocking::store_io;
use super::dedup::diff;
use super::history::HistoryStore;
use super::notifier::{DeliveryReport, EventNotifier};
use super::registry::ListenerRegistry;
use super::scrape::ScrapeExecutor;
use crate::domain::{Destination, EntityKey};
use crate::error::ScrapeError;

/// Poller settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between the starts of consecutive cycles.
    pub interval: Duration,
    /// Maximum number of entities processed at once within a cycle.
    pub max_concurrent_entities: usize,
    /// Where scrape failures are reported, besides the log.
    pub alert_destination: Option<Destination>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            max_concurrent_entities: 2,
            alert_destination: None,
        }
    }
}

/// What happened to one entity during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    /// Scraped successfully; nothing new.
    Unchanged,
    /// New events were notified and recorded.
    Updated {
        new_events: usize,
        delivery: DeliveryReport,
    },
    /// The scrape failed; history was left untouched.
    ScrapeFailed(String),
    /// The history could not be read, so the entity was not scraped.
    HistoryUnavailable(String),
    /// Notifications went out but the updated history was not written.
    PersistFailed {
        new_events: usize,
        delivery: DeliveryReport,
        error: String,
    },
}

impl EntityOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ScrapeFailed(_) | Self::HistoryUnavailable(_) | Self::PersistFailed { .. }
        )
    }

    #[must_use]
    pub fn new_events(&self) -> usize {
        match self {
            Self::Updated { new_events, .. } | Self::PersistFailed { new_events, .. } => {
                *new_events
            }
            _ => 0,
        }
    }
}

/// Summary of one full pass over the tracked entities.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<(EntityKey, EntityOutcome)>,
}

impl CycleReport {
    #[must_use]
    pub fn outcome(&self, entity: &EntityKey) -> Option<&EntityOutcome> {
        self.outcomes
            .iter()
            .find(|(key, _)| key == entity)
            .map(|(_, outcome)| outcome)
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }

    #[must_use]
    pub fn new_events(&self) -> usize {
        self.outcomes.iter().map(|(_, o)| o.new_events()).sum()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entities, {} new events, {} failures in {}ms",
            self.outcomes.len(),
            self.new_events(),
            self.failures(),
            (self.finished_at - self.started_at).num_milliseconds()
        )
    }
}

/// Drives polling cycles over every entity in the listener registry.
pub struct Poller {
    config: PollerConfig,
    registry: Arc<ListenerRegistry>,
    history: Arc<HistoryStore>,
    scraper: Arc<ScrapeExecutor>,
    notifier: Arc<EventNotifier>,
}

impl Poller {
    pub fn new(
        config: PollerConfig,
        registry: Arc<ListenerRegistry>,
        history: Arc<HistoryStore>,
        scraper: Arc<ScrapeExecutor>,
        notifier: Arc<EventNotifier>,
    ) -> Self {
        Self {
            config,
            registry,
            history,
            scraper,
            notifier,
        }
    }

    /// Poll on a fixed interval until `shutdown` flips to `true`.
    ///
    /// The first cycle starts immediately. A cycle in progress always runs
    /// to completion; shutdown is observed between cycles.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            interval_secs = self.config.interval.as_secs(),
            concurrency = self.config.max_concurrent_entities,
            "Poller started"
        );

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    info!(
                        entities = report.outcomes.len(),
                        new_events = report.new_events(),
                        failures = report.failures(),
                        "Cycle complete"
                    );
                    if *shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }

        info!("Poller stopped");
    }

    /// Run one cycle over the entities tracked at cycle start.
    pub async fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();

        let registry = Arc::clone(&self.registry);
        let entities = match store_io(move || registry.tracked_entities()).await {
            Ok(entities) => entities,
            Err(e) => {
                error!(error = %e, "Failed to load listener registry, skipping cycle");
                Vec::new()
            }
        };
        debug!(entities = entities.len(), "Cycle started");

        let outcomes = stream::iter(entities)
            .map(|entity| async move {
                let outcome = self.process_entity(&entity).await;
                (entity, outcome)
            })
            .buffer_unordered(self.config.max_concurrent_entities.max(1))
            .collect::<Vec<_>>()
            .await;

        CycleReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }

    /// Scrape, diff, notify and record one entity.
    pub async fn process_entity(&self, entity: &EntityKey) -> EntityOutcome {
        let _guard = self.history.lock(entity).await;

        let history = Arc::clone(&self.history);
        let key = entity.clone();
        let known = match store_io(move || history.load(&key)).await {
            Ok(known) => known,
            Err(e) => {
                error!(entity = %entity, error = %e, "Failed to load history");
                return EntityOutcome::HistoryUnavailable(e.to_string());
            }
        };

        let scraped = match self.scraper.scrape(entity, known.clone()).await.into_result() {
            Ok(events) => events,
            Err(e) => {
                warn!(entity = %entity, error = %e, "Scrape failed, history left unchanged");
                self.report_scrape_failure(entity, &e).await;
                return EntityOutcome::ScrapeFailed(e.to_string());
            }
        };

        let new_events = diff(&scraped, &known);
        if new_events.len() < scraped.len() {
            debug!(
                entity = %entity,
                returned = scraped.len(),
                new = new_events.len(),
                "Scraper returned already-known events"
            );
        }
        if new_events.is_empty() {
            return EntityOutcome::Unchanged;
        }

        info!(entity = %entity, new_events = new_events.len(), "New activity");
        let delivery = self.notifier.notify(entity, &new_events).await;

        let history = Arc::clone(&self.history);
        let key = entity.clone();
        let recorded = new_events.clone();
        match store_io(move || history.append(&key, &recorded)).await {
            Ok(_) => EntityOutcome::Updated {
                new_events: new_events.len(),
                delivery,
            },
            Err(e) => {
                error!(entity = %entity, error = %e, "Failed to persist history");
                EntityOutcome::PersistFailed {
                    new_events: new_events.len(),
                    delivery,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn report_scrape_failure(&self, entity: &EntityKey, error: &ScrapeError) {
        let Some(destination) = &self.config.alert_destination else {
            return;
        };
        let message = self.notifier.formatter().scrape_failure_message(
            entity,
            &self.scraper.source_url(entity),
            error,
        );
        if let Err(e) = self.notifier.send(destination, &message).await {
            warn!(entity = %entity, error = %e, "Failed to deliver scrape failure alert");
        }
    }
}
