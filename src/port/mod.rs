//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  dedup, registry,       ├──────────────┐
//!     │              │  notifier, poller       │              │
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Scraper │            │    Store    │              │ Transport │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```

pub mod outbound;

pub use outbound::scraper::{ActivityScraper, ScrapeOutcome};
pub use outbound::store::{KeyValueStore, TypedStoreExt, UpdateFn};
pub use outbound::transport::{MessageField, NotificationMessage, NotificationTransport};
