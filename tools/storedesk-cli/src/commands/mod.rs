//! CLI command implementations.

pub mod config;
pub mod page;
pub mod pos;

use clap::{Args, Subcommand};

/// Arguments for the pos command.
#[derive(Args)]
pub struct PosArgs {
    #[command(subcommand)]
    pub command: PosCommand,
}

#[derive(Subcommand)]
pub enum PosCommand {
    /// Replay a scripted register session.
    Run {
        /// Session file (JSON).
        session: String,

        /// Catalog file (JSON array of products); overrides the session's own.
        #[arg(long)]
        catalog: Option<String>,
    },
}

/// Arguments for the page command.
#[derive(Args)]
pub struct PageArgs {
    #[command(subcommand)]
    pub command: PageCommand,
}

#[derive(Subcommand)]
pub enum PageCommand {
    /// Create an empty page.
    Init {
        /// Page id.
        page: String,
    },
    /// Print a page tree.
    Show {
        /// Page id.
        page: String,
    },
    /// List stored pages.
    List,
    /// Apply editor operations from a file and save the result.
    Apply {
        /// Page id.
        page: String,

        /// Operations file (JSON array).
        ops: String,

        /// Print the result without saving it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete a page.
    Delete {
        /// Page id.
        page: String,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// List the widget types pages can hold.
    Widgets,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,

        /// File format: toml or json.
        #[arg(long, default_value = "toml")]
        format: String,
    },
}
