//! Market data source abstraction and concrete daily-bar providers.
//!
//! The sync engine only ever talks to the [`providers::MarketDataSource`]
//! trait; providers map their native wire payloads into the canonical
//! [`models::bar::DailyBar`] shape at this boundary, so validation and
//! persistence never see vendor JSON.

pub mod errors;
pub mod models;
pub mod providers;
