#![allow(dead_code)]

pub mod failing_store;
pub mod recording_transport;
pub mod scripted_scraper;

use std::sync::Arc;

use alto_tracker::domain::{ActivityEvent, AddressLink, EntityKey, EntityKind};
use alto_tracker::infrastructure::bootstrap::{Stores, Tracker};
use alto_tracker::infrastructure::config::Config;

use failing_store::FailingStore;
use recording_transport::RecordingTransport;
use scripted_scraper::ScriptedScraper;

pub const BASE_URL: &str = "https://alto.build/";

/// A tracker wired to in-memory stores, a scripted scraper and a recording
/// transport. History goes through a [`FailingStore`] for fault injection.
pub struct TestTracker {
    pub tracker: Tracker,
    pub scraper: ScriptedScraper,
    pub transport: RecordingTransport,
    pub history: FailingStore,
}

pub fn test_tracker(config: &Config) -> TestTracker {
    let scraper = ScriptedScraper::new();
    let transport = RecordingTransport::new();
    let history = FailingStore::new();
    let stores = Stores {
        history: Arc::new(history.clone()),
        ..Stores::in_memory()
    };
    let tracker = Tracker::assemble(
        config,
        stores,
        Arc::new(scraper.clone()),
        Arc::new(transport.clone()),
    );
    TestTracker {
        tracker,
        scraper,
        transport,
        history,
    }
}

pub fn collection(name: &str) -> EntityKey {
    EntityKey::new(EntityKind::Collection, name)
}

pub fn wallet(name: &str) -> EntityKey {
    EntityKey::new(EntityKind::Wallet, name)
}

pub fn page_url(entity: &EntityKey) -> String {
    entity.source_url(BASE_URL)
}

pub fn listing(entity: &EntityKey, token_id: &str, price: &str) -> ActivityEvent {
    ActivityEvent::new("List", token_id, &page_url(entity)).with_price(price)
}

pub fn transfer(entity: &EntityKey, token_id: &str, to: &str) -> ActivityEvent {
    ActivityEvent::new("Transfer", token_id, &page_url(entity))
        .with_to(AddressLink::new(to, format!("{BASE_URL}profile/{to}")))
}
