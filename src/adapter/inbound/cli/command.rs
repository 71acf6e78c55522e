//! Command-line interface definitions.
//!
//! Defines the CLI structure using `clap`: the long-running `run` command
//! plus the registration commands that edit the persisted state.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::EntityKind;

/// Marketplace activity tracker with webhook notifications
#[derive(Parser, Debug)]
#[command(name = "alto-tracker")]
#[command(version)]
pub struct Cli {
    /// Path to the config file [default: config.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll tracked entities until interrupted
    Run,

    /// Start tracking a collection or wallet
    Add(AddArgs),

    /// Stop tracking a collection or wallet
    Remove(RemoveArgs),

    /// Allow a group to register trackers
    Allow(GroupArgs),

    /// Revoke a group's permission to register trackers
    Disallow(GroupArgs),

    /// List tracked entities
    List(ListArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Kind of entity named by a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EntityKindArg {
    Collection,
    Wallet,
}

impl From<EntityKindArg> for EntityKind {
    fn from(kind: EntityKindArg) -> Self {
        match kind {
            EntityKindArg::Collection => Self::Collection,
            EntityKindArg::Wallet => Self::Wallet,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// What the link points at
    pub kind: EntityKindArg,

    /// Marketplace link; its last path segment names the entity
    pub link: String,

    /// Webhook URL that receives notifications
    pub destination: String,

    /// Group registering the tracker
    #[arg(long)]
    pub group: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// What the link points at
    pub kind: EntityKindArg,

    /// Marketplace link; its last path segment names the entity
    pub link: String,

    /// Group that registered the tracker
    #[arg(long)]
    pub group: String,

    /// Also delete the entity's history once no group tracks it
    #[arg(long)]
    pub purge: bool,
}

#[derive(Args, Debug)]
pub struct GroupArgs {
    /// Group identifier
    pub group: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only entities this group tracks
    #[arg(long)]
    pub group: Option<String>,
}

/// Diagnostic subcommands.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file
    Config,
}
