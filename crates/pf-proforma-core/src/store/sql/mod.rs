//! SQLite store built on Diesel with an r2d2 connection pool.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::path::{Path, PathBuf};

use super::records::{FinancingRecord, NewResult, ProjectRecord, ResultRow, StoreSnapshot};
use super::ProjectStore;
use crate::error::ProjectFinanceError;
use crate::ProjectFinanceResult;

mod models;
mod schema;

use models::*;
use schema::*;

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
type SqlitePooled = PooledConnection<ConnectionManager<SqliteConnection>>;

const MAX_POOL_SIZE: u32 = 4;

/// Project store in a SQLite database file.
#[derive(Clone)]
pub struct SqliteStore {
    path: PathBuf,
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").field("path", &self.path).finish()
    }
}

fn map_diesel_error(err: diesel::result::Error) -> ProjectFinanceError {
    ProjectFinanceError::Storage(format!("SQLite query failed: {err}"))
}

impl SqliteStore {
    /// Open an existing database file.
    pub fn open(path: impl AsRef<Path>) -> ProjectFinanceResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(ProjectFinanceError::Storage(format!(
                "SQLite database '{}' does not exist (run `init-db` first?)",
                path.display()
            )));
        }
        let store = Self::connect(path)?;
        let mut conn = store.conn()?;
        let project_count: i64 = projects::table
            .count()
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;
        tracing::debug!(
            path = %store.path.display(),
            projects = project_count,
            "SQLite store opened"
        );
        Ok(store)
    }

    /// Create (or overwrite) a database with the given contents.
    pub fn create(path: impl AsRef<Path>, snapshot: StoreSnapshot) -> ProjectFinanceResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self::connect(path)?;
        let mut conn = store.conn()?;

        let projects_rows = snapshot
            .projects
            .iter()
            .map(ProjectRow::try_from)
            .collect::<ProjectFinanceResult<Vec<_>>>()?;
        let financing_rows = snapshot
            .financing
            .iter()
            .map(FinancingRow::try_from)
            .collect::<ProjectFinanceResult<Vec<_>>>()?;
        let result_rows = snapshot
            .results
            .iter()
            .map(StoredResultRow::try_from)
            .collect::<ProjectFinanceResult<Vec<_>>>()?;

        conn.transaction(|tx| {
            tx.batch_execute(CREATE_SCHEMA)?;
            if !projects_rows.is_empty() {
                diesel::insert_into(projects::table)
                    .values(&projects_rows)
                    .execute(tx)?;
            }
            if !financing_rows.is_empty() {
                diesel::insert_into(financing::table)
                    .values(&financing_rows)
                    .execute(tx)?;
            }
            if !result_rows.is_empty() {
                diesel::insert_into(proforma_results::table)
                    .values(&result_rows)
                    .execute(tx)?;
            }
            Ok::<_, diesel::result::Error>(())
        })
        .map_err(map_diesel_error)?;

        tracing::info!(path = %store.path.display(), "SQLite store created");
        Ok(store)
    }

    fn connect(path: PathBuf) -> ProjectFinanceResult<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(path.to_string_lossy());
        let pool = Pool::builder()
            .max_size(MAX_POOL_SIZE)
            .build(manager)
            .map_err(|e| {
                ProjectFinanceError::Storage(format!(
                    "Failed to connect to '{}': {e}",
                    path.display()
                ))
            })?;
        Ok(Self { path, pool })
    }

    fn conn(&self) -> ProjectFinanceResult<SqlitePooled> {
        self.pool
            .get()
            .map_err(|e| ProjectFinanceError::Storage(format!("Connection pool: {e}")))
    }

    /// Read every table back into a snapshot.
    pub fn snapshot(&self) -> ProjectFinanceResult<StoreSnapshot> {
        let mut conn = self.conn()?;
        let projects_rows = projects::table
            .order(projects::project_id)
            .select(ProjectRow::as_select())
            .load::<ProjectRow>(&mut conn)
            .map_err(map_diesel_error)?;
        let financing_rows = financing::table
            .order(financing::financing_id)
            .select(FinancingRow::as_select())
            .load::<FinancingRow>(&mut conn)
            .map_err(map_diesel_error)?;
        let result_rows = proforma_results::table
            .order(proforma_results::result_id)
            .select(StoredResultRow::as_select())
            .load::<StoredResultRow>(&mut conn)
            .map_err(map_diesel_error)?;

        Ok(StoreSnapshot {
            projects: projects_rows
                .into_iter()
                .map(ProjectRecord::try_from)
                .collect::<ProjectFinanceResult<_>>()?,
            financing: financing_rows
                .into_iter()
                .map(FinancingRecord::try_from)
                .collect::<ProjectFinanceResult<_>>()?,
            results: result_rows
                .into_iter()
                .map(ResultRow::try_from)
                .collect::<ProjectFinanceResult<_>>()?,
        })
    }
}

fn not_found(entity: &str, id: i64) -> ProjectFinanceError {
    ProjectFinanceError::NotFound {
        entity: entity.into(),
        id,
    }
}

/// Ids outside `i32` cannot exist in the tables.
fn key(id: i64) -> Option<i32> {
    i32::try_from(id).ok()
}

impl ProjectStore for SqliteStore {
    fn project(&self, project_id: i64) -> ProjectFinanceResult<ProjectRecord> {
        let id = key(project_id).ok_or_else(|| not_found("project", project_id))?;
        let mut conn = self.conn()?;
        projects::table
            .filter(projects::project_id.eq(id))
            .select(ProjectRow::as_select())
            .first::<ProjectRow>(&mut conn)
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| not_found("project", project_id))?
            .try_into()
    }

    fn financing(&self, project_id: i64) -> ProjectFinanceResult<FinancingRecord> {
        let id = key(project_id).ok_or_else(|| not_found("financing", project_id))?;
        let mut conn = self.conn()?;
        financing::table
            .filter(financing::project_id.eq(id))
            .order(financing::financing_id)
            .select(FinancingRow::as_select())
            .first::<FinancingRow>(&mut conn)
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| not_found("financing", project_id))?
            .try_into()
    }

    fn record_result(&mut self, result: NewResult) -> ProjectFinanceResult<ResultRow> {
        // Results must reference a known project
        self.project(result.project_id)?;

        let new_row = NewResultRow::try_from(&result)?;
        let mut conn = self.conn()?;
        let stored: StoredResultRow = diesel::insert_into(proforma_results::table)
            .values(&new_row)
            .returning(StoredResultRow::as_returning())
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;

        let row = ResultRow::try_from(stored)?;
        tracing::info!(
            project_id = row.project_id,
            result_id = row.result_id,
            "Pro forma result stored"
        );
        Ok(row)
    }

    fn latest_result(&self, project_id: i64) -> ProjectFinanceResult<ResultRow> {
        let id = key(project_id).ok_or_else(|| not_found("pro forma result", project_id))?;
        let mut conn = self.conn()?;
        proforma_results::table
            .filter(proforma_results::project_id.eq(id))
            .order((proforma_results::run_date.desc(), proforma_results::result_id.desc()))
            .select(StoredResultRow::as_select())
            .first::<StoredResultRow>(&mut conn)
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| not_found("pro forma result", project_id))?
            .try_into()
    }
}
