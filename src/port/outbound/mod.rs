//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the tracker's infrastructure dependencies: the
//! activity scraper, the notification transport, and persistence.

pub mod scraper;
pub mod store;
pub mod transport;
