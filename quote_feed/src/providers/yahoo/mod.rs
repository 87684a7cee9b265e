//! Yahoo Finance daily-bar provider.
//!
//! Talks to the public v8 chart endpoint
//! (`/v8/finance/chart/{symbol}?period1=..&period2=..&interval=1d`), which
//! needs no API key. Requests are gated through a [`governor`] rate limiter
//! because the endpoint throttles aggressive clients.

mod response;

use chrono::{Duration, NaiveDate, NaiveTime};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, StatusCode};

use crate::{errors::SourceError, models::bar::DailyBar, providers::MarketDataSource};
use async_trait::async_trait;
use response::ChartResponse;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stock-sync/0.1)";

/// Daily bar source backed by the Yahoo Finance chart API.
pub struct YahooDailySource {
    client: Client,
    limiter: DefaultDirectRateLimiter,
    base_url: String,
}

impl YahooDailySource {
    /// Creates a provider against the public Yahoo endpoint.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a provider against a custom base URL (used by tests to point
    /// at a local stub server).
    pub fn with_base_url(base_url: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(SourceError::from_reqwest)?;

        Ok(Self {
            client,
            // Two requests per second keeps well under Yahoo's throttle.
            limiter: RateLimiter::direct(Quota::per_second(nonzero!(2u32))),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Midnight UTC of `date` as a unix timestamp, the unit the chart API expects.
fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl MarketDataSource for YahooDailySource {
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, SourceError> {
        self.limiter.until_ready().await;

        // period2 is exclusive upstream; push it one day out so `end` itself
        // is included.
        let period1 = unix_midnight(start);
        let period2 = unix_midnight(end + Duration::days(1));

        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        tracing::debug!(symbol, %start, %end, "requesting daily bars");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .map_err(SourceError::from_reqwest)?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(SourceError::NotFound(symbol.to_string())),
            StatusCode::TOO_MANY_REQUESTS => return Err(SourceError::RateLimited),
            status if !status.is_success() => {
                return Err(SourceError::Transport(format!(
                    "unexpected HTTP status {status}"
                )));
            }
            _ => {}
        }

        let payload: ChartResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        if let Some(err) = payload.chart.error {
            return Err(if err.code.eq_ignore_ascii_case("not found") {
                SourceError::NotFound(symbol.to_string())
            } else {
                SourceError::Transport(format!("{}: {}", err.code, err.description))
            });
        }

        let bars = payload
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.swap_remove(0))
                }
            })
            .map(response::into_bars)
            .unwrap_or_default();

        tracing::debug!(symbol, count = bars.len(), "received daily bars");
        Ok(bars)
    }
}
