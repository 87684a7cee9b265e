//! SQLite implementation of [`RecordStore`].

use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use diesel::dsl::{count_star, max, min};
use diesel::prelude::*;
use quote_feed::models::bar::DailyBar;

use super::{RecordStore, StoreError, StoreResult, connection::connect_sqlite};
use crate::{freshness::FreshnessState, range::DateRange};
use crate::store::schema::daily_record::dsl as dr;

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::store::schema::daily_record)]
struct RecordRow<'a> {
    symbol: &'a str,
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

#[derive(Queryable, Debug)]
struct StoredRecord {
    #[allow(dead_code)]
    symbol: String,
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

/// Record store backed by a single SQLite connection.
///
/// The connection is guarded by a mutex, which serializes writes at the
/// process level; SQLite itself serializes at the file level across
/// processes (WAL + busy timeout).
pub struct SqliteStore {
    conn: Mutex<SqliteConnection>,
}

impl SqliteStore {
    /// Opens the database at `database_url` with tuned PRAGMAs. Migrations
    /// must already have been applied (see [`super::migrate::run`]).
    pub fn open(database_url: &str) -> StoreResult<Self> {
        let conn = connect_sqlite(database_url)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn parse_date(stored_symbol: &str, value: &str) -> StoreResult<NaiveDate> {
        value.parse().map_err(|_| StoreError::CorruptDate {
            symbol: stored_symbol.to_string(),
            value: value.to_string(),
        })
    }
}

impl RecordStore for SqliteStore {
    fn freshness(&self, ticker: &str) -> StoreResult<Option<FreshnessState>> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        // ISO text dates order lexicographically, so MIN/MAX are the
        // earliest/latest trading dates.
        let (earliest, latest, total): (Option<String>, Option<String>, i64) = dr::daily_record
            .filter(dr::symbol.eq(ticker))
            .select((min(dr::date), max(dr::date), count_star()))
            .first(&mut *conn)?;

        match (earliest, latest) {
            (Some(earliest), Some(latest)) if total > 0 => Ok(Some(FreshnessState {
                earliest: Self::parse_date(ticker, &earliest)?,
                latest: Self::parse_date(ticker, &latest)?,
                total_records: total as u64,
            })),
            _ => Ok(None),
        }
    }

    fn upsert(&self, ticker: &str, bars: &[DailyBar]) -> StoreResult<usize> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        // One immediate transaction per call: either every row of the batch
        // becomes visible or none does.
        let written = conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            let mut written = 0usize;
            for bar in bars {
                let row = RecordRow {
                    symbol: ticker,
                    date: bar.date.to_string(),
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                };
                diesel::insert_into(dr::daily_record)
                    .values(&row)
                    .on_conflict((dr::symbol, dr::date))
                    .do_update()
                    .set((
                        dr::open.eq(bar.open),
                        dr::high.eq(bar.high),
                        dr::low.eq(bar.low),
                        dr::close.eq(bar.close),
                        dr::volume.eq(bar.volume),
                    ))
                    .execute(conn)?;
                written += 1;
            }
            Ok(written)
        })?;

        Ok(written)
    }

    fn read_range(&self, ticker: &str, range: Option<DateRange>) -> StoreResult<Vec<DailyBar>> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        let mut query = dr::daily_record
            .filter(dr::symbol.eq(ticker))
            .into_boxed();
        if let Some(range) = range {
            query = query
                .filter(dr::date.ge(range.start.to_string()))
                .filter(dr::date.le(range.end.to_string()));
        }

        let rows: Vec<StoredRecord> = query.order(dr::date.asc()).load(&mut *conn)?;

        rows.into_iter()
            .map(|row| {
                Ok(DailyBar {
                    date: Self::parse_date(ticker, &row.date)?,
                    open: row.open,
                    high: row.high,
                    low: row.low,
                    close: row.close,
                    volume: row.volume,
                })
            })
            .collect()
    }
}
