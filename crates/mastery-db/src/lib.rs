pub mod backend;
pub mod connection;
pub mod error;
pub mod migrations;
pub mod queries;
pub mod store;

pub use backend::{KvBackend, MemoryBackend, SqliteBackend, Versioned};
pub use connection::{Database, DatabaseConfig};
pub use error::{DbError, Result};
pub use store::{EntryStore, Snapshot, ENTRIES_KEY, SESSION_KEY, TASKS_KEY};

/// Open (creating if needed) the SQLite database at `path` and wrap it in
/// an [`EntryStore`].
pub async fn open_sqlite_store(path: &str) -> Result<EntryStore<SqliteBackend>> {
    let db = Database::open(DatabaseConfig::at(path)).await?;
    Ok(EntryStore::new(SqliteBackend::new(db)))
}
