//! Diesel table definition for the record store.

diesel::table! {
    /// Daily OHLCV rows, one per `(symbol, date)`. Dates are ISO-8601 text,
    /// so lexicographic order matches chronological order.
    daily_record (symbol, date) {
        /// Ticker symbol.
        symbol -> Text,
        /// Trading date, `YYYY-MM-DD`.
        date -> Text,
        /// Opening price.
        open -> Double,
        /// Session high.
        high -> Double,
        /// Session low.
        low -> Double,
        /// Closing price.
        close -> Double,
        /// Shares traded.
        volume -> BigInt,
    }
}
