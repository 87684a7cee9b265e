//! SQLite connection helper.

use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};

use super::StoreResult;

/// Opens a SQLite connection with WAL journaling, foreign keys on, and a
/// 5000ms busy timeout, so concurrent readers don't trip over the writer.
pub fn connect_sqlite(database_url: &str) -> StoreResult<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)?;

    sql_query("PRAGMA journal_mode=WAL;").execute(&mut conn)?;
    sql_query("PRAGMA foreign_keys=ON;").execute(&mut conn)?;
    sql_query("PRAGMA busy_timeout=5000;").execute(&mut conn)?;

    Ok(conn)
}
