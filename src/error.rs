//! Error types for the tracker.
//!
//! Cycle-level failures ([`ScrapeError`], [`NotificationError`],
//! [`StoreError`]) are recovered inside the poller. Command-level failures
//! ([`RegistrationError`]) are surfaced to whoever issued the command.

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// An event record that cannot become an [`ActivityEvent`](crate::domain::event::ActivityEvent).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("event record is missing {field}")]
    MissingField { field: &'static str },

    #[error("{side} address and {side} address url must be both present or both absent")]
    HalfAddress { side: &'static str },
}

/// Failure to obtain activity from the source site.
#[derive(Error, Debug, Clone)]
pub enum ScrapeError {
    #[error("failed to launch scraper: {0}")]
    Launch(String),

    #[error("scraper timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("scraper exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("unparseable activity listing: {0}")]
    Parse(String),

    #[error("scrape task aborted: {0}")]
    Aborted(String),
}

/// Failure to deliver one message to one destination.
#[derive(Error, Debug, Clone)]
pub enum NotificationError {
    #[error("invalid destination '{destination}': {reason}")]
    InvalidDestination { destination: String, reason: String },

    #[error("destination unreachable: {0}")]
    Unreachable(String),

    #[error("destination rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Persistence failures from a key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt store data for key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store task aborted: {0}")]
    Aborted(String),
}

/// User-visible rejections from the registration command surface.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("this group is not allowed to register trackers")]
    NotAuthorized,

    #[error("you provided an invalid link: {0}")]
    InvalidLink(String),

    #[error("you provided an invalid destination: {0}")]
    InvalidDestination(#[source] NotificationError),

    #[error("this group is not tracking {0}")]
    NotRegistered(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Top-level error for the binary and composition root.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
