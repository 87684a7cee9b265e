use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use quote_feed::providers::yahoo::YahooDailySource;
use shared_utils::env::get_env_var;
use stock_sync::{
    batch::BatchCoordinator,
    clock::{Clock, SystemClock},
    config::SyncConfig,
    executor::SyncExecutor,
    planner::PlannerConfig,
    range,
    scheduler::UpdateScheduler,
    store::{migrate, repo::SqliteStore},
};

#[derive(Parser)]
#[command(version, about = "Incremental daily market data sync")]
struct Cli {
    /// Path to the sync config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config and DATABASE_URL)
    #[arg(long, value_name = "PATH")]
    db: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// One-shot sync of a single symbol or the whole universe
    Sync {
        /// Sync only this symbol
        #[arg(long)]
        symbol: Option<String>,

        /// Sync every configured symbol (default when --symbol is absent)
        #[arg(long)]
        all: bool,

        /// Re-fetch the full configured historical window
        #[arg(long)]
        force: bool,

        /// Explicit range start (YYYY-MM-DD); implies a forced range sync
        #[arg(long, value_name = "DATE")]
        start: Option<NaiveDate>,

        /// Explicit range end (YYYY-MM-DD); defaults to today
        #[arg(long, value_name = "DATE")]
        end: Option<NaiveDate>,
    },

    /// Continuous mode: sync the universe on a fixed interval
    Watch {
        /// Hours between passes (default from config: 6)
        #[arg(long, value_name = "HOURS")]
        interval_hours: Option<u64>,
    },

    /// Read-only freshness report; performs no fetch
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = SyncConfig::load(cli.config.as_deref())?;

    let database_url = match cli.db.or_else(|| config.database_url.clone()) {
        Some(url) => url,
        None => get_env_var("DATABASE_URL")
            .context("no database configured: pass --db, set database_url, or DATABASE_URL")?,
    };

    migrate::run(&database_url)?;
    let store = Arc::new(SqliteStore::open(&database_url)?);
    let source = Arc::new(YahooDailySource::new()?);
    let clock = Arc::new(SystemClock);
    let today = clock.today();

    // A misconfigured historical start is an operator error; surface it
    // before any pass runs.
    range::validate(config.history_start, None, today)
        .map_err(|e| anyhow::anyhow!("history_start: {e}"))?;

    let planner_cfg = PlannerConfig {
        history_start: config.history_start,
        max_days_back: config.max_days_back,
    };
    let executor = SyncExecutor::new(
        source,
        store.clone(),
        clock.clone(),
        Duration::from_secs(config.fetch_timeout_secs),
    );
    let coordinator = BatchCoordinator::new(executor, store, clock, planner_cfg);

    match cli.cmd {
        Cmd::Summary => {
            let report = coordinator.freshness_report(&config.symbols)?;
            println!("{report}");
        }

        Cmd::Sync {
            symbol,
            all,
            force,
            start,
            end,
        } => {
            let scope: Vec<String> = match (&symbol, all) {
                (Some(symbol), false) => vec![symbol.to_uppercase()],
                _ => config.symbols.clone(),
            };

            let summary = if let Some(start) = start {
                // Explicit operator-supplied range: validated fatally here,
                // with the suggestion embedded in the error message.
                let explicit = range::validate(start, end, today)?;
                coordinator.run_explicit(&scope, explicit).await
            } else {
                if end.is_some() {
                    bail!("--end requires --start");
                }
                let mut scheduler = UpdateScheduler::new(
                    coordinator,
                    scope,
                    Duration::from_secs(config.interval_hours * 3600),
                );
                scheduler.run_once(force).await
            };

            println!("{summary}");
            if summary.has_failures() {
                bail!(
                    "{} of {} symbols failed",
                    summary.failure_count(),
                    summary.outcomes.len()
                );
            }
        }

        Cmd::Watch { interval_hours } => {
            let hours = interval_hours.unwrap_or(config.interval_hours);
            if hours == 0 {
                bail!("--interval-hours must be at least 1");
            }

            let (stop_tx, stop_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("stop requested; finishing current pass");
                    let _ = stop_tx.send(true);
                }
            });

            let mut scheduler = UpdateScheduler::new(
                coordinator,
                config.symbols.clone(),
                Duration::from_secs(hours * 3600),
            );
            scheduler.run_continuous(stop_rx).await;
        }
    }

    Ok(())
}
