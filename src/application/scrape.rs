//! Bounded execution of blocking scrapes off the async scheduler.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{ActivityEvent, EntityKey};
use crate::error::ScrapeError;
use crate::port::{ActivityScraper, ScrapeOutcome};

/// Runs an [`ActivityScraper`] on the blocking thread pool with at most
/// `max_concurrent` scrapes in flight.
///
/// The concurrency permit is owned by the blocking task, so it is only
/// released once the scraper has actually returned, even if the caller
/// stopped waiting.
pub struct ScrapeExecutor {
    scraper: Arc<dyn ActivityScraper>,
    permits: Arc<Semaphore>,
    base_url: String,
}

impl ScrapeExecutor {
    pub fn new(
        scraper: Arc<dyn ActivityScraper>,
        max_concurrent: usize,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            scraper,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            base_url: base_url.into(),
        }
    }

    /// Marketplace page polled for `entity`.
    #[must_use]
    pub fn source_url(&self, entity: &EntityKey) -> String {
        entity.source_url(&self.base_url)
    }

    /// Scrape `entity`'s activity page, passing `known` to the scraper.
    pub async fn scrape(&self, entity: &EntityKey, known: Vec<ActivityEvent>) -> ScrapeOutcome {
        let url = self.source_url(entity);

        let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
            return ScrapeOutcome::failed(ScrapeError::Aborted("scrape pool closed".into()));
        };

        debug!(entity = %entity, url = %url, known = known.len(), "Scraping activity");
        let scraper = Arc::clone(&self.scraper);
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            scraper.scrape(&url, &known)
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => ScrapeOutcome::failed(ScrapeError::Aborted(e.to_string())),
        }
    }
}
