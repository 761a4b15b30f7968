use super::records::{FinancingRecord, NewResult, ProjectRecord, ResultRow, StoreSnapshot};
use super::ProjectStore;
use crate::error::ProjectFinanceError;
use crate::ProjectFinanceResult;

/// Store backed by an in-process snapshot. Used directly in tests and as the
/// working set of [`super::JsonFileStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: StoreSnapshot,
}

impl InMemoryStore {
    pub fn new(data: StoreSnapshot) -> Self {
        Self { data }
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.data
    }

    fn next_result_id(&self) -> i64 {
        self.data
            .results
            .iter()
            .map(|r| r.result_id)
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl ProjectStore for InMemoryStore {
    fn project(&self, project_id: i64) -> ProjectFinanceResult<ProjectRecord> {
        self.data
            .projects
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned()
            .ok_or_else(|| ProjectFinanceError::NotFound {
                entity: "project".into(),
                id: project_id,
            })
    }

    fn financing(&self, project_id: i64) -> ProjectFinanceResult<FinancingRecord> {
        self.data
            .financing
            .iter()
            .find(|f| f.project_id == project_id)
            .cloned()
            .ok_or_else(|| ProjectFinanceError::NotFound {
                entity: "financing".into(),
                id: project_id,
            })
    }

    fn record_result(&mut self, result: NewResult) -> ProjectFinanceResult<ResultRow> {
        // Results must reference a known project
        self.project(result.project_id)?;

        let row = ResultRow {
            result_id: self.next_result_id(),
            project_id: result.project_id,
            run_date: result.run_date,
            discount_rate: result.discount_rate,
            npv: result.metrics.npv,
            irr: result.metrics.irr,
            irr_converged: result.metrics.irr_converged,
            payback_year: result.metrics.payback_year,
            min_dscr: result.metrics.min_dscr,
        };
        self.data.results.push(row.clone());
        Ok(row)
    }

    fn latest_result(&self, project_id: i64) -> ProjectFinanceResult<ResultRow> {
        self.data
            .results
            .iter()
            .filter(|r| r.project_id == project_id)
            .max_by_key(|r| (r.run_date, r.result_id))
            .cloned()
            .ok_or_else(|| ProjectFinanceError::NotFound {
                entity: "pro forma result".into(),
                id: project_id,
            })
    }
}
