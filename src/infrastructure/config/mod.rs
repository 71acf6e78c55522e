//! Infrastructure configuration modules.

pub mod logging;
pub mod settings;

pub use logging::LoggingConfig;
pub use settings::{Config, NotifierConfig, ScraperConfig, StorageConfig, TrackerConfig};
