#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use quote_feed::{errors::SourceError, models::bar::DailyBar, providers::MarketDataSource};
use stock_sync::{
    batch::BatchCoordinator,
    clock::FixedClock,
    executor::SyncExecutor,
    planner::PlannerConfig,
    store::{migrate, repo::SqliteStore},
};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn bar(date: NaiveDate, close: f64) -> DailyBar {
    DailyBar {
        date,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1_000,
    }
}

pub struct TestDb {
    _dir: TempDir,
    pub path: String,
}

/// Fresh migrated SQLite store on a temp file, kept alive by the returned
/// guard.
pub fn setup_store() -> (TestDb, Arc<SqliteStore>) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("test.db").to_string_lossy().to_string();

    migrate::run(&path).expect("migrations");
    let store = SqliteStore::open(&path).expect("open store");

    (TestDb { _dir: dir, path }, Arc::new(store))
}

pub enum ScriptedReply {
    /// Bars served like a real provider: filtered to the requested range.
    Bars(Vec<DailyBar>),
    /// Bars served verbatim, range ignored (misbehaving provider).
    RawBars(Vec<DailyBar>),
    /// Provider rejects the symbol.
    NotFound,
    /// Provider stalls before answering empty.
    SlowEmpty(Duration),
}

/// Scripted market data source that records every fetch it receives.
#[derive(Default)]
pub struct ScriptedSource {
    replies: HashMap<String, ScriptedReply>,
    calls: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        self.replies
            .insert(symbol.to_string(), ScriptedReply::Bars(bars));
        self
    }

    pub fn with_raw_bars(mut self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        self.replies
            .insert(symbol.to_string(), ScriptedReply::RawBars(bars));
        self
    }

    pub fn with_not_found(mut self, symbol: &str) -> Self {
        self.replies
            .insert(symbol.to_string(), ScriptedReply::NotFound);
        self
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.replies
            .insert(symbol.to_string(), ScriptedReply::SlowEmpty(delay));
        self
    }

    /// Every `(symbol, start, end)` fetch observed so far.
    pub fn calls(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), start, end));

        match self.replies.get(symbol) {
            None => Ok(vec![]),
            Some(ScriptedReply::Bars(bars)) => Ok(bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .cloned()
                .collect()),
            Some(ScriptedReply::RawBars(bars)) => Ok(bars.clone()),
            Some(ScriptedReply::NotFound) => Err(SourceError::NotFound(symbol.to_string())),
            Some(ScriptedReply::SlowEmpty(delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(vec![])
            }
        }
    }
}

pub const HISTORY_START: (i32, u32, u32) = (2020, 1, 1);

pub fn coordinator(
    store: Arc<SqliteStore>,
    source: Arc<ScriptedSource>,
    today: NaiveDate,
) -> BatchCoordinator {
    coordinator_with_timeout(store, source, today, Duration::from_secs(5))
}

pub fn coordinator_with_timeout(
    store: Arc<SqliteStore>,
    source: Arc<ScriptedSource>,
    today: NaiveDate,
    fetch_timeout: Duration,
) -> BatchCoordinator {
    let clock = Arc::new(FixedClock(today));
    let executor = SyncExecutor::new(source, store.clone(), clock.clone(), fetch_timeout);
    BatchCoordinator::new(
        executor,
        store,
        clock,
        PlannerConfig {
            history_start: d(HISTORY_START.0, HISTORY_START.1, HISTORY_START.2),
            max_days_back: 365,
        },
    )
}
