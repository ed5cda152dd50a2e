use std::collections::HashSet;

use mastery_db::{EntryStore, KvBackend, Snapshot};
use serde::Serialize;
use tracing::{info, warn};

use crate::csv;
use crate::error::{Result, TrackerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub tasks: usize,
    pub entries: usize,
}

#[derive(Serialize)]
struct CatalogRow<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
}

/// Parse and validate a JSON backup without touching any store.
pub fn parse_backup(json: &str) -> Result<Snapshot> {
    let snapshot: Snapshot =
        serde_json::from_str(json).map_err(|e| TrackerError::MalformedImport(e.to_string()))?;

    let mut task_ids = HashSet::new();
    for task in &snapshot.tasks {
        if !task_ids.insert(task.id.as_str()) {
            return Err(TrackerError::MalformedImport(format!("duplicate task id {}", task.id)));
        }
    }

    let mut slots = HashSet::new();
    for entry in &snapshot.entries {
        if !slots.insert((entry.task_id.as_str(), entry.date)) {
            return Err(TrackerError::MalformedImport(format!(
                "duplicate entry for {} on {}",
                entry.task_id, entry.date
            )));
        }
    }

    Ok(snapshot)
}

/// Export, import and reset of the tracked data.
pub struct DataManager<'a, B> {
    store: &'a EntryStore<B>,
}

impl<'a, B: KvBackend> DataManager<'a, B> {
    pub fn new(store: &'a EntryStore<B>) -> Self {
        Self { store }
    }

    pub async fn export_backup(&self) -> Result<String> {
        let snapshot = self.store.snapshot().await?;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Replace all tasks and entries with the backup. Nothing is written
    /// unless the whole document parses and validates.
    pub async fn import_backup(&self, json: &str) -> Result<ImportSummary> {
        let snapshot = match parse_backup(json) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Rejected import: {}", e);
                return Err(e);
            }
        };

        self.store.restore(&snapshot).await?;
        info!("Imported {} tasks and {} entries", snapshot.tasks.len(), snapshot.entries.len());

        Ok(ImportSummary { tasks: snapshot.tasks.len(), entries: snapshot.entries.len() })
    }

    /// The catalog as `id,name,category` CSV.
    pub async fn export_catalog_csv(&self) -> Result<String> {
        let tasks = self.store.list_tasks().await?;
        let rows: Vec<CatalogRow<'_>> = tasks
            .iter()
            .map(|task| CatalogRow {
                id: &task.id,
                name: &task.name,
                category: task.category.as_str(),
            })
            .collect();

        csv::to_csv(&rows)
    }

    pub async fn clear_entries(&self) -> Result<()> {
        Ok(self.store.clear_entries().await?)
    }
}
