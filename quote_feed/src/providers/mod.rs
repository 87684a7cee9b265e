//! Provider abstraction for daily market data.
//!
//! [`MarketDataSource`] is the single seam between the sync engine and any
//! market data vendor. It is async and object safe, so callers can hold a
//! `dyn MarketDataSource` and select the concrete provider at runtime.

pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{errors::SourceError, models::bar::DailyBar};

/// Fetches daily bars for one symbol over an inclusive date range.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Returns every daily bar the provider has for `symbol` in
    /// `[start, end]`. An empty vector is a valid answer (e.g. the range
    /// only covers market holidays) and must not be treated as an error.
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, SourceError>;
}
