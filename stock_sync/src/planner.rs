//! Incremental fetch planning.
//!
//! Pure policy, no I/O: given what the store already holds, decide the
//! minimal date range worth fetching. The ordering is deliberate — force
//! overrides freshness, freshness overrides defaulting, and the
//! `max_days_back` floor keeps a long-dormant symbol from requesting an
//! unbounded backlog (it re-bootstraps instead).

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::{freshness::FreshnessState, range::DateRange};

/// Why a plan chose its range (or chose not to fetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanReason {
    /// The store holds nothing for this symbol; full historical bootstrap.
    NoExistingData,
    /// Fetch only the gap between the latest stored date and today.
    IncrementalGap,
    /// Operator override: re-fetch the whole configured window.
    ForcedRefresh,
    /// The latest stored date is already current; nothing to do.
    UpToDate,
}

/// What to fetch for one symbol. `range == None` means no network call is
/// needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    /// The symbol this plan is for.
    pub symbol: String,
    /// Inclusive fetch range, or `None` when the symbol is current.
    pub range: Option<DateRange>,
    /// Why this range was chosen.
    pub reason: PlanReason,
}

/// Planner inputs that come from configuration rather than store state.
#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    /// Start of the configured historical window (bootstrap / force start).
    pub history_start: NaiveDate,
    /// Floor on incremental fetches: never reach further back than
    /// `today - max_days_back`.
    pub max_days_back: i64,
}

/// Computes the minimal fetch range for `symbol`.
pub fn plan(
    symbol: &str,
    freshness: Option<&FreshnessState>,
    force: bool,
    today: NaiveDate,
    cfg: &PlannerConfig,
) -> FetchPlan {
    if force {
        return FetchPlan {
            symbol: symbol.to_string(),
            range: Some(DateRange {
                start: cfg.history_start,
                end: today,
            }),
            reason: PlanReason::ForcedRefresh,
        };
    }

    let Some(freshness) = freshness else {
        return FetchPlan {
            symbol: symbol.to_string(),
            range: Some(DateRange {
                start: cfg.history_start,
                end: today,
            }),
            reason: PlanReason::NoExistingData,
        };
    };

    if freshness.latest >= today {
        return FetchPlan {
            symbol: symbol.to_string(),
            range: None,
            reason: PlanReason::UpToDate,
        };
    }

    let floor = today - Duration::days(cfg.max_days_back);
    let start = (freshness.latest + Duration::days(1)).max(floor);
    FetchPlan {
        symbol: symbol.to_string(),
        range: Some(DateRange { start, end: today }),
        reason: PlanReason::IncrementalGap,
    }
}
