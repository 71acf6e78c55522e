//! Composition root: wires stores, adapters and services from configuration.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::scraper::CommandScraper;
use crate::adapter::outbound::store::{JsonFileStore, MemoryStore};
use crate::adapter::outbound::transport::{LogTransport, WebhookTransport};
use crate::application::{
    AllowList, EventNotifier, HistoryStore, ListenerRegistry, MessageFormatter, Poller, Registrar,
    ScrapeExecutor,
};
use crate::error::Result;
use crate::infrastructure::config::{Config, StorageConfig};
use crate::port::{ActivityScraper, KeyValueStore, NotificationTransport};

/// The three persisted collections.
pub struct Stores {
    pub history: Arc<dyn KeyValueStore>,
    pub listeners: Arc<dyn KeyValueStore>,
    pub allowed_groups: Arc<dyn KeyValueStore>,
}

impl Stores {
    /// Open JSON-file stores under the configured data directory.
    #[allow(clippy::result_large_err)]
    pub fn open(config: &StorageConfig) -> Result<Self> {
        Ok(Self {
            history: Arc::new(JsonFileStore::open(config.history_path())?),
            listeners: Arc::new(JsonFileStore::open(config.listeners_path())?),
            allowed_groups: Arc::new(JsonFileStore::open(config.allowed_groups_path())?),
        })
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            history: Arc::new(MemoryStore::new()),
            listeners: Arc::new(MemoryStore::new()),
            allowed_groups: Arc::new(MemoryStore::new()),
        }
    }
}

/// Fully wired services sharing one set of stores and one scrape pool.
pub struct Tracker {
    pub poller: Poller,
    pub registrar: Registrar,
}

impl Tracker {
    /// Wire services around explicit stores and adapters.
    pub fn assemble(
        config: &Config,
        stores: Stores,
        scraper: Arc<dyn ActivityScraper>,
        transport: Arc<dyn NotificationTransport>,
    ) -> Self {
        let registry = Arc::new(ListenerRegistry::new(stores.listeners));
        let history = Arc::new(HistoryStore::new(stores.history));
        let allow_list = Arc::new(AllowList::new(stores.allowed_groups));

        let executor = Arc::new(ScrapeExecutor::new(
            scraper,
            config.tracker.max_concurrent_scrapes,
            config.tracker.marketplace_base_url.clone(),
        ));
        let notifier = Arc::new(EventNotifier::new(
            Arc::clone(&registry),
            transport,
            MessageFormatter::new(config.tracker.price_unit.clone()),
        ));

        let poller = Poller::new(
            config.poller(),
            Arc::clone(&registry),
            Arc::clone(&history),
            Arc::clone(&executor),
            Arc::clone(&notifier),
        );
        let registrar = Registrar::new(registry, history, allow_list, executor, notifier);

        Self { poller, registrar }
    }
}

/// Webhook transport, or a logging one in dry-run mode.
#[must_use]
pub fn build_transport(config: &Config) -> Arc<dyn NotificationTransport> {
    if config.notifier.dry_run {
        info!("Dry run: notifications will be logged, not sent");
        Arc::new(LogTransport)
    } else {
        Arc::new(WebhookTransport::new(config.webhook()))
    }
}

/// Build the production tracker from configuration.
#[allow(clippy::result_large_err)]
pub fn bootstrap(config: &Config) -> Result<Tracker> {
    let stores = Stores::open(&config.storage)?;
    let scraper = Arc::new(CommandScraper::new(config.command_scraper()));
    info!(
        data_dir = %config.storage.data_dir.display(),
        scraper = %config.scraper.program,
        "Tracker components initialized"
    );
    Ok(Tracker::assemble(config, stores, scraper, build_transport(config)))
}
