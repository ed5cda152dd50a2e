use mastery_common::config::ProgressConfig;
use mastery_db::{open_sqlite_store, EntryStore, KvBackend, MemoryBackend, SqliteBackend};
use tracing::info;

use crate::backup::DataManager;
use crate::config::TrackerConfig;
use crate::error::Result;
use crate::progress::ProgressAggregator;
use crate::reports::ReportGenerator;
use crate::session_manager::SessionManager;

/// Owns the store and hands out the per-concern views over it.
pub struct Tracker<B> {
    store: EntryStore<B>,
    progress_config: ProgressConfig,
}

impl Tracker<SqliteBackend> {
    pub async fn open(config: &TrackerConfig) -> Result<Self> {
        let store = open_sqlite_store(&config.database.path).await?;
        info!("Tracker opened at {}", config.database.path);
        Ok(Self::with_store(store, config.progress.clone()))
    }

    pub async fn close(self) {
        self.store.into_backend().close().await;
    }
}

impl Tracker<MemoryBackend> {
    pub fn in_memory() -> Self {
        Self::with_store(EntryStore::new(MemoryBackend::new()), ProgressConfig::default())
    }
}

impl<B: KvBackend> Tracker<B> {
    pub fn with_store(store: EntryStore<B>, progress_config: ProgressConfig) -> Self {
        Self { store, progress_config }
    }

    pub fn store(&self) -> &EntryStore<B> {
        &self.store
    }

    pub fn progress_config(&self) -> &ProgressConfig {
        &self.progress_config
    }

    pub fn progress(&self) -> ProgressAggregator<'_, B> {
        ProgressAggregator::new(&self.store)
    }

    pub fn reports(&self) -> ReportGenerator<'_, B> {
        ReportGenerator::new(&self.store, self.progress_config.clone())
    }

    pub fn session(&self) -> SessionManager<'_, B> {
        SessionManager::new(&self.store)
    }

    pub fn data(&self) -> DataManager<'_, B> {
        DataManager::new(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_sqlite_tracker() {
        let dir = tempdir().unwrap();
        let mut config = TrackerConfig::default();
        config.database.path = dir.path().join("tracker.db").to_string_lossy().to_string();

        let tracker = Tracker::open(&config).await.unwrap();
        assert_eq!(tracker.store().list_tasks().await.unwrap().len(), 15);
        tracker.close().await;
    }

    #[tokio::test]
    async fn test_in_memory_uses_default_thresholds() {
        let tracker = Tracker::in_memory();
        assert_eq!(tracker.progress_config().streak_threshold, 0.8);
        assert!(!tracker.session().is_authenticated().await.unwrap());
    }
}
