//! Batch synchronization across a symbol set.
//!
//! One symbol's failure never poisons the pass: every symbol in the scope is
//! processed and the summary always has one outcome per symbol, in input
//! order.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::{
    clock::Clock,
    executor::{SyncExecutor, SyncOutcome, SyncStatus},
    freshness::{FreshnessReport, FreshnessRow},
    planner::{self, FetchPlan, PlanReason, PlannerConfig},
    range::DateRange,
    store::{RecordStore, StoreResult},
};

/// Ordered per-symbol outcomes of one pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    /// One outcome per requested symbol, in request order.
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncSummary {
    /// Whether any symbol ended in a source or persistence failure.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(SyncOutcome::is_failure)
    }

    /// Number of failed symbols.
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Total records merged across the pass.
    pub fn records_written(&self) -> usize {
        self.outcomes.iter().map(|o| o.records_written).sum()
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        write!(
            f,
            "{}/{} symbols ok, {} records written",
            self.outcomes.len() - self.failure_count(),
            self.outcomes.len(),
            self.records_written(),
        )
    }
}

/// Drives the plan → fetch → merge sequence for every symbol in a scope.
pub struct BatchCoordinator {
    executor: SyncExecutor,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    planner_cfg: PlannerConfig,
}

impl BatchCoordinator {
    /// Builds a coordinator. The store handle is shared with the executor;
    /// it is the only mutable resource symbols have in common.
    pub fn new(
        executor: SyncExecutor,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        planner_cfg: PlannerConfig,
    ) -> Self {
        Self {
            executor,
            store,
            clock,
            planner_cfg,
        }
    }

    /// Runs one pass over `symbols`. Always returns one outcome per symbol:
    /// a freshness read error or executor failure is recorded for that
    /// symbol and the loop moves on.
    pub async fn run(&self, symbols: &[String], force: bool) -> SyncSummary {
        let today = self.clock.today();
        let mut outcomes = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let freshness = match self.store.freshness(symbol) {
                Ok(freshness) => freshness,
                Err(err) => {
                    tracing::error!(symbol = %symbol, %err, "freshness read failed");
                    outcomes.push(SyncOutcome {
                        symbol: symbol.clone(),
                        status: SyncStatus::PersistenceError,
                        records_written: 0,
                        records_dropped: 0,
                        message: Some(err.to_string()),
                    });
                    continue;
                }
            };

            let plan = planner::plan(symbol, freshness.as_ref(), force, today, &self.planner_cfg);
            outcomes.push(self.executor.execute(&plan).await);
        }

        SyncSummary { outcomes }
    }

    /// Syncs an operator-supplied explicit range for each symbol, bypassing
    /// the planner. Callers must validate the range first; the executor
    /// re-checks it against the clock regardless.
    pub async fn run_explicit(&self, symbols: &[String], explicit: DateRange) -> SyncSummary {
        let mut outcomes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let plan = FetchPlan {
                symbol: symbol.clone(),
                range: Some(explicit),
                reason: PlanReason::ForcedRefresh,
            };
            outcomes.push(self.executor.execute(&plan).await);
        }
        SyncSummary { outcomes }
    }

    /// Read-only reporting mode: derives freshness for every symbol with no
    /// fetch and no mutation. Never touches the market data source.
    pub fn freshness_report(&self, symbols: &[String]) -> StoreResult<FreshnessReport> {
        let today = self.clock.today();
        let mut rows = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let state = self.store.freshness(symbol)?;
            rows.push(FreshnessRow {
                symbol: symbol.clone(),
                days_since_update: state.as_ref().map(|s| s.days_since_update(today)),
                state,
            });
        }
        Ok(FreshnessReport { rows })
    }
}
