//! Handler for the `run` command.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::bootstrap;
use crate::infrastructure::config::Config;

/// Poll until Ctrl-C. The cycle in progress when the signal arrives is
/// allowed to finish.
pub async fn execute(config: Config) -> Result<()> {
    config.init_logging();
    let tracker = bootstrap(&config)?;

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Marketplace", &config.tracker.marketplace_base_url);
    output::field(
        "Interval",
        format!("{} min", config.tracker.update_interval_minutes),
    );
    output::field("Data dir", config.storage.data_dir.display());
    output::field("Tracked", tracker.registrar.tracked(None)?.len());
    if config.notifier.dry_run {
        output::warning("Dry run: notifications are logged, not sent");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, stopping after the current cycle"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, stopping"),
        }
        let _ = shutdown_tx.send(true);
    });

    tracker.poller.run(shutdown_rx).await;
    Ok(())
}
