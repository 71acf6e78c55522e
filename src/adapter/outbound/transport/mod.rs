//! Notification transports.
//!
//! Implements the `port::NotificationTransport` trait for webhooks and for
//! dry runs.

mod dry_run;
mod webhook;

pub use dry_run::LogTransport;
pub use webhook::{WebhookConfig, WebhookTransport};
