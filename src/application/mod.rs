//! Application services (use cases).
//!
//! These services combine the domain model with the outbound ports to
//! implement polling, notification and registration.

mod blocking;
pub mod dedup;
pub mod history;
pub mod message;
pub mod notifier;
pub mod poller;
pub mod registration;
pub mod registry;
pub mod scrape;

pub use dedup::diff;
pub use history::HistoryStore;
pub use message::MessageFormatter;
pub use notifier::{DeliveryReport, EventNotifier};
pub use poller::{CycleReport, EntityOutcome, Poller, PollerConfig};
pub use registration::{AllowListChange, Registrar, Registration, TrackedSummary};
pub use registry::{AllowList, Listener, ListenerRegistry, ListenerSet};
pub use scrape::ScrapeExecutor;
