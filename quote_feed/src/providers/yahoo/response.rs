//! Wire shapes for the Yahoo v8 chart payload and mapping into [`DailyBar`].

use chrono::DateTime;
use serde::Deserialize;

use crate::models::bar::DailyBar;

#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
}

/// Parallel arrays, one slot per timestamp. Individual slots are null for
/// sessions Yahoo has no trade data for, so every field is `Option`.
#[derive(Deserialize, Debug, Default)]
pub struct QuoteBlock {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<i64>>,
}

/// Flattens one chart result into bars, skipping slots with any null field.
pub fn into_bars(result: ChartResult) -> Vec<DailyBar> {
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Vec::new();
    };

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let row = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        match row {
            (Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
                bars.push(DailyBar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
            _ => {
                tracing::debug!(timestamp = ts, "skipping incomplete quote slot");
            }
        }
    }
    bars
}
