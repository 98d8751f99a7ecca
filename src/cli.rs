use clap::{Args, Parser, Subcommand};
use sge_export::Format;
use sge_extract::models::AccountId;
use std::path::PathBuf;

/// Export a Steam library, enriched with store metadata, as a spreadsheet.
#[derive(Debug, Parser)]
#[command(name = "sge", version)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Increase log verbosity; repeat for more. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export an account's owned games.
    Export(ExportArgs),
    /// Inspect or maintain the metadata cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// 64-bit Steam account id.
    #[arg(long, value_parser = parse_account)]
    pub account: AccountId,
    /// csv, tsv, xlsx or ods. Defaults to the configured format.
    #[arg(long, value_parser = parse_format)]
    pub format: Option<Format>,
    /// Output file. Defaults to `games.<ext>` in the working directory.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Skip store metadata; export owned games and playtime only.
    #[arg(long)]
    pub no_metadata: bool,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Count cached entries by availability.
    Stats,
    /// Remove entries that are stale under the configured policy.
    Prune {
        /// Compact the database file afterwards.
        #[arg(long)]
        vacuum: bool,
    },
}

fn parse_account(value: &str) -> Result<AccountId, String> {
    value.parse().map_err(|error: sge_extract::error::Error| error.to_string())
}

fn parse_format(value: &str) -> Result<Format, String> {
    value.parse().map_err(|error: sge_export::error::Error| error.to_string())
}

/// Log filter directive for the given number of `-v` flags.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
