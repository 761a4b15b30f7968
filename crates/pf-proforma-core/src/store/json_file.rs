use std::fs;
use std::path::{Path, PathBuf};

use super::memory::InMemoryStore;
use super::records::{FinancingRecord, NewResult, ProjectRecord, ResultRow, StoreSnapshot};
use super::ProjectStore;
use crate::error::ProjectFinanceError;
use crate::ProjectFinanceResult;

/// Store persisted as a single pretty-printed JSON document.
///
/// The whole file is loaded on open and rewritten after every result insert
/// (temp file + rename, so a crash never leaves a truncated store).
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl JsonFileStore {
    /// Open an existing store file.
    pub fn open(path: impl AsRef<Path>) -> ProjectFinanceResult<Self> {
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|e| {
            ProjectFinanceError::Storage(format!(
                "Failed to read store '{}': {e} (run `init-db` first?)",
                path.display()
            ))
        })?;
        let snapshot: StoreSnapshot = serde_json::from_str(&contents)?;
        tracing::debug!(
            path = %path.display(),
            projects = snapshot.projects.len(),
            results = snapshot.results.len(),
            "Store opened"
        );
        Ok(Self {
            path,
            inner: InMemoryStore::new(snapshot),
        })
    }

    /// Create (or overwrite) a store file with the given contents.
    pub fn create(path: impl AsRef<Path>, snapshot: StoreSnapshot) -> ProjectFinanceResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            inner: InMemoryStore::new(snapshot),
        };
        store.flush()?;
        tracing::info!(path = %store.path.display(), "Store created");
        Ok(store)
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        self.inner.snapshot()
    }

    fn flush(&self) -> ProjectFinanceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(self.inner.snapshot())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ProjectStore for JsonFileStore {
    fn project(&self, project_id: i64) -> ProjectFinanceResult<ProjectRecord> {
        self.inner.project(project_id)
    }

    fn financing(&self, project_id: i64) -> ProjectFinanceResult<FinancingRecord> {
        self.inner.financing(project_id)
    }

    fn record_result(&mut self, result: NewResult) -> ProjectFinanceResult<ResultRow> {
        let row = self.inner.record_result(result)?;
        self.flush()?;
        tracing::info!(
            project_id = row.project_id,
            result_id = row.result_id,
            "Pro forma result stored"
        );
        Ok(row)
    }

    fn latest_result(&self, project_id: i64) -> ProjectFinanceResult<ResultRow> {
        self.inner.latest_result(project_id)
    }
}
