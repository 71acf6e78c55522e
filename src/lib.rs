//! Alto Tracker - marketplace activity tracking with webhook notifications.
//!
//! Periodically scrapes the activity feed of every tracked collection or
//! wallet, works out which events have not been seen before, and delivers
//! one notification per new event to every destination registered for that
//! entity.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Events, entity keys and identifiers
//! - **`port`** - Traits for scraping, notification transport and storage
//! - **`application`** - Dedup, listener registry, history, notifier,
//!   poller and the registration commands
//! - **`adapter`** - Command scraper, webhook transport, JSON-file store and
//!   the CLI
//! - **`infrastructure`** - Configuration, logging and wiring
//!
//! # Example
//!
//! ```
//! use alto_tracker::application::diff;
//! use alto_tracker::domain::ActivityEvent;
//!
//! let url = "https://alto.build/collections/foo";
//! let known = vec![ActivityEvent::new("List", "1", url)];
//! let fresh = vec![
//!     ActivityEvent::new("List", "1", url),
//!     ActivityEvent::new("Sale", "1", url).with_price("10"),
//! ];
//!
//! let new_events = diff(&fresh, &known);
//! assert_eq!(new_events.len(), 1);
//! assert_eq!(new_events[0].event_type(), "Sale");
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
