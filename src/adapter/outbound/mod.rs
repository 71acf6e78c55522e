//! Outbound adapters (driven side).

pub mod scraper;
pub mod store;
pub mod transport;
