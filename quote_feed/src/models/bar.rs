//! Canonical in-memory representation of one daily OHLCV bar.
//!
//! Every [`MarketDataSource`](crate::providers::MarketDataSource)
//! implementation outputs this shape regardless of vendor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily bar for one symbol.
///
/// The owning symbol is carried alongside (callers fetch per symbol), so the
/// bar itself only holds the trading date and prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading date of this bar.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Highest price of the session.
    pub high: f64,
    /// Lowest price of the session.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Shares traded during the session.
    pub volume: i64,
}
