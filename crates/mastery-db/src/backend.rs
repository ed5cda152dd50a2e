use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::queries::KvQueries;

/// A stored document together with its write counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: String,
    pub version: i64,
}

/// Key-value storage of whole JSON documents with optimistic concurrency.
///
/// `put` with `expected_version: None` requires the key to be absent;
/// `Some(v)` requires the stored version to still be `v`. A mismatch is
/// reported as [`DbError::Conflict`] and nothing is written.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Versioned>>;

    async fn put(&self, key: &str, value: String, expected_version: Option<i64>) -> Result<i64>;

    async fn remove(&self, key: &str) -> Result<bool>;

    /// Write every item unconditionally and atomically.
    async fn replace_all(&self, items: Vec<(String, String)>) -> Result<()>;
}

#[async_trait]
impl<B: KvBackend + ?Sized> KvBackend for Arc<B> {
    async fn get(&self, key: &str) -> Result<Option<Versioned>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: String, expected_version: Option<i64>) -> Result<i64> {
        (**self).put(key, value, expected_version).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key).await
    }

    async fn replace_all(&self, items: Vec<(String, String)>) -> Result<()> {
        (**self).replace_all(items).await
    }
}

/// Durable backend over the SQLite `kv_store` table.
pub struct SqliteBackend {
    db: Database,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}

#[async_trait]
impl KvBackend for SqliteBackend {
    async fn get(&self, key: &str) -> Result<Option<Versioned>> {
        Ok(KvQueries::get(&self.db, key)
            .await?
            .map(|record| Versioned { value: record.value, version: record.version }))
    }

    async fn put(&self, key: &str, value: String, expected_version: Option<i64>) -> Result<i64> {
        match expected_version {
            None => KvQueries::insert(&self.db, key, &value).await,
            Some(version) => KvQueries::update(&self.db, key, &value, version).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        KvQueries::delete(&self.db, key).await
    }

    async fn replace_all(&self, items: Vec<(String, String)>) -> Result<()> {
        KvQueries::replace_all(&self.db, &items).await
    }
}

/// Process-local backend used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, Versioned>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Versioned>> {
        Ok(self.records.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: String, expected_version: Option<i64>) -> Result<i64> {
        let mut records = self.records.lock();
        let actual = records.get(key).map(|record| record.version);

        if actual != expected_version {
            return Err(DbError::Conflict { key: key.to_string(), expected: expected_version, actual });
        }

        let version = actual.unwrap_or(0) + 1;
        records.insert(key.to_string(), Versioned { value, version });
        Ok(version)
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.records.lock().remove(key).is_some())
    }

    async fn replace_all(&self, items: Vec<(String, String)>) -> Result<()> {
        let mut records = self.records.lock();
        for (key, value) in items {
            let version = records.get(&key).map_or(1, |record| record.version + 1);
            records.insert(key, Versioned { value, version });
        }
        Ok(())
    }
}
