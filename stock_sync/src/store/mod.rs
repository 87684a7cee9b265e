//! Durable storage of per-symbol daily records.
//!
//! One logical table, `daily_record`, keyed by `(symbol, date)`. The store
//! guarantees at most one row per key (upsert, last-write-wins) and derives
//! freshness from the rows themselves — there is no separate bookkeeping
//! table to drift out of date.

pub mod connection;
pub mod migrate;
pub mod repo;
pub mod schema;

use quote_feed::models::bar::DailyBar;
use thiserror::Error;

use crate::{freshness::FreshnessState, range::DateRange};

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query or write failed.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// The database could not be opened.
    #[error("connection error: {0}")]
    Connection(#[from] diesel::result::ConnectionError),

    /// A stored date column did not parse back into a date.
    #[error("corrupt stored date {value:?} for symbol {symbol}")]
    CorruptDate {
        /// Symbol whose row is corrupt.
        symbol: String,
        /// The raw stored value.
        value: String,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Portable persistence surface; the SQLite implementation lives in
/// [`repo::SqliteStore`].
pub trait RecordStore: Send + Sync {
    /// Derives the freshness of `symbol` from its stored rows. `Ok(None)`
    /// means zero records exist — the normal state for a never-synced
    /// symbol, not an error.
    fn freshness(&self, symbol: &str) -> StoreResult<Option<FreshnessState>>;

    /// Merges `bars` for `symbol`, overwriting rows that share a
    /// `(symbol, date)` key. All rows of one call become visible together
    /// or not at all. Returns the number of rows written.
    fn upsert(&self, symbol: &str, bars: &[DailyBar]) -> StoreResult<usize>;

    /// Reads stored rows for `symbol`, optionally restricted to `range`,
    /// ordered by date ascending. Used by downstream consumers, not by the
    /// sync path itself.
    fn read_range(&self, symbol: &str, range: Option<DateRange>) -> StoreResult<Vec<DailyBar>>;
}
