use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use alto_tracker::domain::ActivityEvent;
use alto_tracker::error::ScrapeError;
use alto_tracker::port::{ActivityScraper, ScrapeOutcome};

type Script = Result<Vec<ActivityEvent>, ScrapeError>;

#[derive(Default)]
struct State {
    scripts: HashMap<String, VecDeque<Script>>,
    calls: Vec<(String, usize)>,
}

/// Scraper that replays queued results per page URL.
///
/// Pages with nothing queued scrape as empty.
#[derive(Clone, Default)]
pub struct ScriptedScraper {
    state: Arc<Mutex<State>>,
}

impl ScriptedScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_events(&self, url: &str, events: Vec<ActivityEvent>) {
        self.push(url, Ok(events));
    }

    pub fn push_failure(&self, url: &str, error: ScrapeError) {
        self.push(url, Err(error));
    }

    /// `(url, known event count)` for every scrape, in call order.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.state.lock().expect("lock scraper state").calls.clone()
    }

    fn push(&self, url: &str, script: Script) {
        self.state
            .lock()
            .expect("lock scraper state")
            .scripts
            .entry(url.to_string())
            .or_default()
            .push_back(script);
    }
}

impl ActivityScraper for ScriptedScraper {
    fn scrape(&self, url: &str, known_events: &[ActivityEvent]) -> ScrapeOutcome {
        let mut state = self.state.lock().expect("lock scraper state");
        state.calls.push((url.to_string(), known_events.len()));
        let script = state
            .scripts
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Vec::new()));

        match script {
            Ok(events) => ScrapeOutcome::ok(events),
            Err(error) => ScrapeOutcome::failed(error),
        }
    }
}
