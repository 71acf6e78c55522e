//! CLI module graph and dispatch.

pub mod check;
pub mod command;
pub mod output;
pub mod run;
pub mod tracker;

use std::path::PathBuf;

use self::command::{CheckCommand, Cli, Commands};
use self::output::OutputConfig;
use crate::application::Registrar;
use crate::error::Result;
use crate::infrastructure::bootstrap::bootstrap;
use crate::infrastructure::config::Config;

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Execute a parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let (config, config_path) = load_config(cli.config)?;

    match cli.command {
        Commands::Run => run::execute(config).await,
        Commands::Add(args) => tracker::add(&registrar(&config)?, args).await,
        Commands::Remove(args) => tracker::remove(&registrar(&config)?, args).await,
        Commands::Allow(args) => tracker::allow(&registrar(&config)?, args),
        Commands::Disallow(args) => tracker::disallow(&registrar(&config)?, args),
        Commands::List(args) => tracker::list(&registrar(&config)?, args),
        Commands::Check(CheckCommand::Config) => {
            check::execute_config(&config, config_path.as_deref())
        }
    }
}

#[allow(clippy::result_large_err)]
fn registrar(config: &Config) -> Result<Registrar> {
    Ok(bootstrap(config)?.registrar)
}

/// Load the explicit config file, or `config.toml` when present, or
/// defaults. Returns the path actually read.
#[allow(clippy::result_large_err)]
fn load_config(explicit: Option<PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    match explicit {
        Some(path) => Ok((Config::load(&path)?, Some(path))),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            let config = Config::load_or_default(&path)?;
            Ok((config, path.exists().then_some(path)))
        }
    }
}
