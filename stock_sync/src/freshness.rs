//! Per-symbol freshness, derived from the record set itself.
//!
//! There is deliberately no "last sync" side table: the store is the single
//! source of truth and freshness is recomputed on demand, so a checkpoint
//! can never drift from the data it describes.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// How current a symbol's stored data is.
///
/// Transient: owned by the synchronization call that computed it and stale
/// the moment new records are merged. Never cache across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreshnessState {
    /// Earliest stored trading date.
    pub earliest: NaiveDate,
    /// Latest stored trading date.
    pub latest: NaiveDate,
    /// Number of stored records.
    pub total_records: u64,
}

impl FreshnessState {
    /// Whole days between `today` and the latest stored record.
    pub fn days_since_update(&self, today: NaiveDate) -> i64 {
        (today - self.latest).num_days()
    }
}

/// One line of the read-only freshness report.
#[derive(Debug, Clone, Serialize)]
pub struct FreshnessRow {
    /// The symbol this row describes.
    pub symbol: String,
    /// Derived state, or `None` for a never-synced symbol.
    pub state: Option<FreshnessState>,
    /// Staleness in days; `None` when there is no data at all.
    pub days_since_update: Option<i64>,
}

/// Freshness of every requested symbol, in request order.
#[derive(Debug, Clone, Serialize)]
pub struct FreshnessReport {
    /// Per-symbol rows.
    pub rows: Vec<FreshnessRow>,
}

impl FreshnessReport {
    /// Symbols whose latest record is more than one day old (or missing).
    pub fn stale_symbols(&self) -> Vec<&FreshnessRow> {
        self.rows
            .iter()
            .filter(|row| row.days_since_update.is_none_or(|days| days > 1))
            .collect()
    }
}

impl fmt::Display for FreshnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:<12} {:<12} {:>8} {:>6}",
            "symbol", "earliest", "latest", "records", "stale"
        )?;
        for row in &self.rows {
            match &row.state {
                Some(state) => writeln!(
                    f,
                    "{:<8} {:<12} {:<12} {:>8} {:>5}d",
                    row.symbol,
                    state.earliest.to_string(),
                    state.latest.to_string(),
                    state.total_records,
                    row.days_since_update.unwrap_or(0),
                )?,
                None => writeln!(
                    f,
                    "{:<8} {:<12} {:<12} {:>8} {:>6}",
                    row.symbol, "-", "-", 0, "-"
                )?,
            }
        }

        let stale = self.stale_symbols();
        if !stale.is_empty() {
            writeln!(f, "\n{} symbol(s) need updates:", stale.len())?;
            for row in stale {
                match row.days_since_update {
                    Some(days) => writeln!(f, "  {}: {} days old", row.symbol, days)?,
                    None => writeln!(f, "  {}: no data", row.symbol)?,
                }
            }
        }
        Ok(())
    }
}
