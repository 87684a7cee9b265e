//! Injected source of "today".
//!
//! Every future-date check and freshness computation is relative to a
//! [`Clock`] passed in by the caller, never an ambient `now()` call, so the
//! planner and validator stay deterministic under test.

use chrono::{Local, NaiveDate};

/// Supplies the current civil date.
pub trait Clock: Send + Sync {
    /// The current date.
    fn today(&self) -> NaiveDate;
}

/// Production clock reading the local system date, matching how operators
/// reason about "today's bars".
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a fixed date, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
