//! `sge`: export a Steam library, enriched with store metadata, as a
//! spreadsheet.
//!
//! # Commands
//!
//! - `sge export --account <id>` - Export an account's owned games
//! - `sge cache stats` - Count cached entries by availability
//! - `sge cache prune [--vacuum]` - Drop stale cache entries

mod cli;
mod error;

use crate::cli::{CacheCommand, Cli, Command, ExportArgs};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use sge_cache::{Database, MetadataStore, Repository, Staleness};
use sge_config::Config;
use sge_library::{Context, ExportRequest};
use sge_steam::{HttpOptions, OwnedGamesClient, RateLimiter, RetryPolicy, StoreClient};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use time::UtcDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli::log_level(cli.verbose))))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let db = open_cache(&config).await?;
    let result = match cli.command {
        Command::Export(args) => export(&config, &db, args).await,
        Command::Cache(command) => cache(&config, &db, command).await,
    };
    db.close().await;
    result
}

async fn open_cache(config: &Config) -> Result<Database> {
    let path = &config.cache.path;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Output(parent.display().to_string()))?;
    }
    info!(path = %path.display(), "opening metadata cache");
    Database::connect(path).await.or_raise(|| ErrorKind::Cache)
}

fn staleness(config: &Config) -> Staleness {
    let staleness = &config.cache.staleness;
    Staleness {
        accessible: staleness.accessible(),
        not_accessible: staleness.not_accessible(),
        unresolved: staleness.unresolved(),
    }
}

fn context(config: &Config, db: &Database) -> Result<Context> {
    let api_key = config.api_key().or_raise(|| ErrorKind::Config)?;
    let mut options = HttpOptions {
        timeout: config.steam.timeout(),
        ..HttpOptions::default()
    };
    if let Some(user_agent) = &config.steam.user_agent {
        options.user_agent = user_agent.clone();
    }

    let owned = OwnedGamesClient::new(api_key, &options)
        .or_raise(|| ErrorKind::Steam)?
        .with_url(&config.steam.owned_games_url);
    let limiter = RateLimiter::new(config.rate_limit.requests, config.rate_limit.window());
    let interval = limiter.interval();
    let retry = RetryPolicy {
        max_retries: config.retry.max_retries,
        base_delay: config.retry.base_delay(),
        max_delay: config.retry.max_delay(),
    };
    let store = StoreClient::new(&options, limiter, retry)
        .or_raise(|| ErrorKind::Steam)?
        .with_url(&config.steam.store_url)
        .with_cool_off(config.rate_limit.cool_off());
    let cache = MetadataStore::new(Repository::from(db), staleness(config));

    let ctx = Context::new(Arc::new(owned), Arc::new(store), cache, interval, options.timeout);
    Ok(match config.workers {
        Some(workers) => ctx.with_workers(workers),
        None => ctx,
    })
}

async fn export(config: &Config, db: &Database, args: ExportArgs) -> Result<()> {
    let ctx = context(config, db)?;
    let format = args.format.unwrap_or(config.export.format);
    let mut request = ExportRequest::new(args.account);
    if args.no_metadata {
        request = request.without_metadata();
    }
    info!(account = %request.account, %format, workers = ctx.workers(), "starting export");

    // Stopping early keeps whatever was already written to the cache.
    let exported = tokio::select! {
        exported = sge_library::export(&ctx, &request, format) => exported.or_raise(|| ErrorKind::Export)?,
        _ = tokio::signal::ctrl_c() => exn::bail!(ErrorKind::Interrupted),
    };

    let output = args.output.unwrap_or_else(|| PathBuf::from(&exported.file_name));
    tokio::fs::write(&output, &exported.bytes)
        .await
        .or_raise(|| ErrorKind::Output(output.display().to_string()))?;
    info!(rows = exported.rows, bytes = exported.bytes.len(), path = %output.display(), "export written");
    Ok(())
}

async fn cache(config: &Config, db: &Database, command: CacheCommand) -> Result<()> {
    let repo = Repository::from(db);
    match command {
        CacheCommand::Stats => {
            let stats = repo.stats().await.or_raise(|| ErrorKind::Cache)?;
            println!("accessible:     {}", stats.accessible);
            println!("not accessible: {}", stats.not_accessible);
            println!("unresolved:     {}", stats.unresolved);
            println!("total:          {}", stats.total());
        },
        CacheCommand::Prune { vacuum } => {
            let removed = repo
                .prune(&staleness(config), UtcDateTime::now())
                .await
                .or_raise(|| ErrorKind::Cache)?;
            info!(removed, "pruned stale cache entries");
            if vacuum {
                db.vacuum().await.or_raise(|| ErrorKind::Cache)?;
            }
        },
    }
    Ok(())
}
