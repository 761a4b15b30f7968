//! Persistence for project inputs and pro forma results.
//!
//! The engine itself never touches a store; callers fetch records, run the
//! model and hand the metrics back through [`ProjectStore::record_result`].

pub mod json_file;
pub mod memory;
pub mod records;
pub mod seed;
#[cfg(feature = "sql-store")]
pub mod sql;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;
pub use records::{FinancingRecord, NewResult, ProjectRecord, ResultRow, StoreSnapshot};
pub use seed::seed_snapshot;
#[cfg(feature = "sql-store")]
pub use sql::SqliteStore;

use std::fmt;
use std::path::PathBuf;

use crate::error::ProjectFinanceError;
use crate::ProjectFinanceResult;

/// Keyed access to projects, their financing, and stored results.
pub trait ProjectStore {
    /// Project by id, or `NotFound`.
    fn project(&self, project_id: i64) -> ProjectFinanceResult<ProjectRecord>;

    /// Financing terms for a project, or `NotFound`.
    fn financing(&self, project_id: i64) -> ProjectFinanceResult<FinancingRecord>;

    /// Persist a result and return it with its assigned id.
    fn record_result(&mut self, result: NewResult) -> ProjectFinanceResult<ResultRow>;

    /// Most recent result for a project, or `NotFound`.
    fn latest_result(&self, project_id: i64) -> ProjectFinanceResult<ResultRow>;
}

impl<S: ProjectStore + ?Sized> ProjectStore for Box<S> {
    fn project(&self, project_id: i64) -> ProjectFinanceResult<ProjectRecord> {
        (**self).project(project_id)
    }

    fn financing(&self, project_id: i64) -> ProjectFinanceResult<FinancingRecord> {
        (**self).financing(project_id)
    }

    fn record_result(&mut self, result: NewResult) -> ProjectFinanceResult<ResultRow> {
        (**self).record_result(result)
    }

    fn latest_result(&self, project_id: i64) -> ProjectFinanceResult<ResultRow> {
        (**self).latest_result(project_id)
    }
}

/// Where a store lives. `sqlite:` URLs select the SQLite backend; anything
/// without a URL scheme is a JSON file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    JsonFile(PathBuf),
    Sqlite(PathBuf),
}

impl StoreLocation {
    /// Parse a store location.
    ///
    /// `sqlite:///db/proforma.db` is the relative path `db/proforma.db` and
    /// `sqlite:////var/pf.db` the absolute `/var/pf.db`. `sqlite:pf.db` is
    /// also accepted.
    pub fn parse(location: &str) -> ProjectFinanceResult<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ProjectFinanceError::invalid("database", "Store location is empty"));
        }

        if let Some(rest) = location.strip_prefix("sqlite:") {
            let path = rest
                .strip_prefix("///")
                .or_else(|| rest.strip_prefix("//"))
                .unwrap_or(rest);
            if path.is_empty() {
                return Err(ProjectFinanceError::invalid(
                    "database",
                    format!("SQLite URL '{location}' has no file path"),
                ));
            }
            return Ok(StoreLocation::Sqlite(PathBuf::from(path)));
        }

        if let Some((scheme, _)) = location.split_once("://") {
            return Err(ProjectFinanceError::invalid(
                "database",
                format!("Unsupported store scheme '{scheme}'; use sqlite:/// or a JSON file path"),
            ));
        }

        Ok(StoreLocation::JsonFile(PathBuf::from(location)))
    }

    /// Open an existing store.
    pub fn open(&self) -> ProjectFinanceResult<Box<dyn ProjectStore>> {
        match self {
            StoreLocation::JsonFile(path) => Ok(Box::new(JsonFileStore::open(path)?)),
            StoreLocation::Sqlite(path) => open_sqlite(path),
        }
    }

    /// Create (or replace) a store holding `snapshot`.
    pub fn create(&self, snapshot: StoreSnapshot) -> ProjectFinanceResult<Box<dyn ProjectStore>> {
        match self {
            StoreLocation::JsonFile(path) => Ok(Box::new(JsonFileStore::create(path, snapshot)?)),
            StoreLocation::Sqlite(path) => create_sqlite(path, snapshot),
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreLocation::JsonFile(path) => write!(f, "{}", path.display()),
            StoreLocation::Sqlite(path) => write!(f, "sqlite:///{}", path.display()),
        }
    }
}

#[cfg(feature = "sql-store")]
fn open_sqlite(path: &std::path::Path) -> ProjectFinanceResult<Box<dyn ProjectStore>> {
    Ok(Box::new(SqliteStore::open(path)?))
}

#[cfg(feature = "sql-store")]
fn create_sqlite(
    path: &std::path::Path,
    snapshot: StoreSnapshot,
) -> ProjectFinanceResult<Box<dyn ProjectStore>> {
    Ok(Box::new(SqliteStore::create(path, snapshot)?))
}

#[cfg(not(feature = "sql-store"))]
fn open_sqlite(path: &std::path::Path) -> ProjectFinanceResult<Box<dyn ProjectStore>> {
    Err(sqlite_disabled(path))
}

#[cfg(not(feature = "sql-store"))]
fn create_sqlite(
    path: &std::path::Path,
    _snapshot: StoreSnapshot,
) -> ProjectFinanceResult<Box<dyn ProjectStore>> {
    Err(sqlite_disabled(path))
}

#[cfg(not(feature = "sql-store"))]
fn sqlite_disabled(path: &std::path::Path) -> ProjectFinanceError {
    ProjectFinanceError::Storage(format!(
        "'{}' is a SQLite store but this build lacks the `sql-store` feature",
        path.display()
    ))
}
