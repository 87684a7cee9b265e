//! Embedded schema migrations.

use diesel::{Connection, SqliteConnection, connection::SimpleConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use thiserror::Error;

/// Migrations bundled with the crate; applied by [`run`] before the store
/// is opened.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// A migration could not be applied.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The database could not be opened.
    #[error("connection error: {0}")]
    Connection(#[from] diesel::result::ConnectionError),

    /// Setting up the journal mode failed.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// A pending migration failed to run.
    #[error("migration failed: {0}")]
    Migration(String),
}

/// Applies all pending migrations to the SQLite database at `database_url`,
/// switching it to WAL first.
pub fn run(database_url: &str) -> Result<(), MigrateError> {
    let mut conn = SqliteConnection::establish(database_url)?;
    conn.batch_execute("PRAGMA journal_mode=WAL;")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| MigrateError::Migration(e.to_string()))?;
    Ok(())
}
