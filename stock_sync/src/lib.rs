//! Incremental synchronization engine for daily market data.
//!
//! For each tracked symbol the engine derives freshness from the persisted
//! record set, plans the minimal missing date range, fetches exactly that
//! range from a [`quote_feed::providers::MarketDataSource`], validates it,
//! and merges it without duplication. Batch runs isolate per-symbol
//! failures; the [`scheduler`] drives one-shot and continuous operation.

#![deny(missing_docs)]

pub mod batch;
pub mod clock;
pub mod config;
pub mod executor;
pub mod freshness;
pub mod planner;
pub mod range;
pub mod scheduler;
pub mod store;
