//! Handler for `check config`.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Report the effective configuration. Loading already validated it.
pub fn execute_config(config: &Config, path: Option<&Path>) -> Result<()> {
    output::section("Configuration Check");
    match path {
        Some(path) => output::field("Config", path.display()),
        None => output::field("Config", "defaults"),
    }
    output::success("Configuration is valid");

    output::section("Summary");
    output::field("Marketplace", &config.tracker.marketplace_base_url);
    output::field(
        "Interval",
        format!("{} min", config.tracker.update_interval_minutes),
    );
    output::field("Concurrency", config.tracker.max_concurrent_scrapes);
    output::field("Scraper", &config.scraper.program);
    output::field("Data dir", config.storage.data_dir.display());
    output::field("Dry run", config.notifier.dry_run);

    match &config.tracker.alert_destination {
        Some(_) => output::success("Scrape failure alerts enabled"),
        None => output::warning("No alert destination; scrape failures are only logged"),
    }
    Ok(())
}
