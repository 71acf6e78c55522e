//! Scraper port for reading an entity's activity feed.

use crate::domain::ActivityEvent;
use crate::error::ScrapeError;

/// Result of one scrape of an activity page.
///
/// A failed scrape may still carry a partial list of events; callers that
/// need all-or-nothing semantics must check `error` first.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    /// Unseen events, oldest first.
    pub events: Vec<ActivityEvent>,
    /// Set when the scrape did not complete.
    pub error: Option<ScrapeError>,
}

impl ScrapeOutcome {
    #[must_use]
    pub fn ok(events: Vec<ActivityEvent>) -> Self {
        Self {
            events,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: ScrapeError) -> Self {
        Self {
            events: Vec::new(),
            error: Some(error),
        }
    }

    /// Convert into a `Result`, discarding any partial events on failure.
    pub fn into_result(self) -> Result<Vec<ActivityEvent>, ScrapeError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.events),
        }
    }
}

/// Extracts activity events from a marketplace page.
///
/// # Implementation Notes
///
/// - `scrape` is blocking and may take seconds; the engine always calls it
///   from a blocking worker, never from the async scheduler.
/// - Returned events must be in chronological order (oldest first) and
///   should exclude anything in `known_events`.
/// - Any browser or child process acquired during the call must be released
///   before returning, on success and on failure alike.
pub trait ActivityScraper: Send + Sync {
    /// Scrape the activity listing at `url`.
    fn scrape(&self, url: &str, known_events: &[ActivityEvent]) -> ScrapeOutcome;
}
