//! Executes one symbol's fetch plan: fetch, screen, merge, report.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quote_feed::providers::MarketDataSource;
use serde::Serialize;

use crate::{
    clock::Clock,
    planner::FetchPlan,
    range,
    store::RecordStore,
};

/// Terminal status of one symbol's sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// New records were fetched and merged (possibly zero, e.g. holidays).
    Updated,
    /// Nothing to fetch; store already current.
    UpToDate,
    /// The plan's range failed validation at execution time.
    Rejected,
    /// The data source failed (timeout, unknown symbol, rate limit, ...).
    SourceError,
    /// The store refused the merge; nothing was durably written.
    PersistenceError,
}

/// Immutable per-symbol result, the unit the batch summary aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    /// The symbol this outcome describes.
    pub symbol: String,
    /// Terminal status.
    pub status: SyncStatus,
    /// Rows merged into the store.
    pub records_written: usize,
    /// Fetched rows dropped before merge (future-dated or out of window).
    pub records_dropped: usize,
    /// Operator-facing detail, e.g. the underlying source error.
    pub message: Option<String>,
}

impl SyncOutcome {
    fn new(symbol: &str, status: SyncStatus) -> Self {
        Self {
            symbol: symbol.to_string(),
            status,
            records_written: 0,
            records_dropped: 0,
            message: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Whether this outcome should fail a one-shot run's exit status.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            SyncStatus::SourceError | SyncStatus::PersistenceError
        )
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8} {:?}", self.symbol, self.status)?;
        if self.records_written > 0 || self.records_dropped > 0 {
            write!(
                f,
                " ({} written, {} dropped)",
                self.records_written, self.records_dropped
            )?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Runs one plan end to end against a source and a store.
pub struct SyncExecutor {
    source: Arc<dyn MarketDataSource>,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    fetch_timeout: Duration,
}

impl SyncExecutor {
    /// Builds an executor over the given collaborators. `fetch_timeout`
    /// bounds every source call; a timed-out fetch becomes a
    /// [`SyncStatus::SourceError`] and is never retried within the pass.
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            fetch_timeout,
        }
    }

    /// Executes `plan` for its symbol. Store mutation happens only on the
    /// full-success path; a failed run leaves no partial writes visible.
    pub async fn execute(&self, plan: &FetchPlan) -> SyncOutcome {
        let Some(requested) = plan.range else {
            tracing::info!(symbol = %plan.symbol, "already up to date");
            return SyncOutcome::new(&plan.symbol, SyncStatus::UpToDate);
        };

        // Re-check the range against the clock at execution time: a plan
        // built from a bad configured start, or a hand-built range, must
        // never reach the network.
        let today = self.clock.today();
        if let Err(err) = range::validate(requested.start, Some(requested.end), today) {
            tracing::warn!(symbol = %plan.symbol, %err, "rejecting fetch range");
            return SyncOutcome::new(&plan.symbol, SyncStatus::Rejected).with_message(err.to_string());
        }

        tracing::info!(
            symbol = %plan.symbol,
            range = %requested,
            reason = ?plan.reason,
            "fetching",
        );

        let fetch = self
            .source
            .fetch_daily(&plan.symbol, requested.start, requested.end);
        let fetched = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Err(_) => {
                let message = format!("fetch timed out after {:?}", self.fetch_timeout);
                tracing::warn!(symbol = %plan.symbol, "{message}");
                return SyncOutcome::new(&plan.symbol, SyncStatus::SourceError)
                    .with_message(message);
            }
            Ok(Err(err)) => {
                tracing::warn!(symbol = %plan.symbol, %err, "source fetch failed");
                return SyncOutcome::new(&plan.symbol, SyncStatus::SourceError)
                    .with_message(err.to_string());
            }
            Ok(Ok(bars)) => bars,
        };

        // Screen every row: never merge a future-dated record, and drop
        // rows the source returned outside the requested window.
        let fetched_count = fetched.len();
        let accepted: Vec<_> = fetched
            .into_iter()
            .filter(|bar| {
                let keep = bar.date <= today && requested.contains(bar.date);
                if !keep {
                    tracing::debug!(symbol = %plan.symbol, date = %bar.date, "dropping out-of-bounds row");
                }
                keep
            })
            .collect();
        let dropped = fetched_count - accepted.len();

        match self.store.upsert(&plan.symbol, &accepted) {
            Ok(written) => {
                tracing::info!(symbol = %plan.symbol, written, dropped, "merged");
                let mut outcome = SyncOutcome::new(&plan.symbol, SyncStatus::Updated);
                outcome.records_written = written;
                outcome.records_dropped = dropped;
                if fetched_count == 0 {
                    outcome = outcome.with_message("no trading data in range");
                } else if dropped > 0 {
                    outcome = outcome.with_message(format!("dropped {dropped} out-of-bounds row(s)"));
                }
                outcome
            }
            Err(err) => {
                tracing::error!(symbol = %plan.symbol, %err, "merge failed");
                let mut outcome = SyncOutcome::new(&plan.symbol, SyncStatus::PersistenceError)
                    .with_message(err.to_string());
                outcome.records_dropped = dropped;
                outcome
            }
        }
    }
}
