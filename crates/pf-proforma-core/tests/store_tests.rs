#![cfg(feature = "store")]

use pf_proforma_core::proforma::{run_proforma, ModelConfig};
use pf_proforma_core::store::{seed_snapshot, InMemoryStore, NewResult, ProjectStore};
use pf_proforma_core::ProjectFinanceError;
use pretty_assertions::assert_eq;

fn run_and_store(store: &mut impl ProjectStore, project_id: i64) -> Result<i64, ProjectFinanceError> {
    let project = store.project(project_id)?;
    let financing = store.financing(project_id)?;
    let config = ModelConfig::default();
    let metrics = run_proforma(&project.inputs, &financing.inputs, &config)?;
    let row = store.record_result(NewResult::now(project_id, config.discount_rate, metrics))?;
    Ok(row.result_id)
}

#[test]
fn test_every_seeded_project_evaluates() {
    let mut store = InMemoryStore::new(seed_snapshot());
    for id in 1..=3 {
        run_and_store(&mut store, id).unwrap();
        let latest = store.latest_result(id).unwrap();
        assert_eq!(latest.project_id, id);
        assert!(latest.irr_converged, "project {id} IRR did not converge");
        assert!(latest.min_dscr.is_some());
    }
    assert_eq!(store.snapshot().results.len(), 3);
}

#[test]
fn test_stored_row_mirrors_metrics() {
    let mut store = InMemoryStore::new(seed_snapshot());
    let project = store.project(1).unwrap();
    let financing = store.financing(1).unwrap();
    let config = ModelConfig {
        discount_rate: rust_decimal_macros::dec!(0.065),
        ..ModelConfig::default()
    };
    let metrics = run_proforma(&project.inputs, &financing.inputs, &config).unwrap();

    let row = store
        .record_result(NewResult::now(1, config.discount_rate, metrics.clone()))
        .unwrap();
    assert_eq!(row.discount_rate, config.discount_rate);
    assert_eq!(row.npv, metrics.npv);
    assert_eq!(row.irr, metrics.irr);
    assert_eq!(row.payback_year, metrics.payback_year);
    assert_eq!(row.min_dscr, metrics.min_dscr);
}

#[test]
fn test_missing_project_fails_only_that_evaluation() {
    let mut store = InMemoryStore::new(seed_snapshot());
    let err = run_and_store(&mut store, 42).unwrap_err();
    assert_eq!(err.to_string(), "Not found: no project for project_id=42");
    // The store is still usable
    assert!(run_and_store(&mut store, 2).is_ok());
}

#[cfg(feature = "sql-store")]
#[test]
fn test_sqlite_store_runs_the_same_flow() {
    let dir = std::env::temp_dir().join(format!("pf-proforma-store-tests-{}", std::process::id()));
    let url = format!("sqlite:///{}", dir.join("proforma.db").display());
    let location = pf_proforma_core::store::StoreLocation::parse(&url).unwrap();

    let mut store = location.create(seed_snapshot()).unwrap();
    for id in 1..=3 {
        run_and_store(&mut store, id).unwrap();
    }
    drop(store);

    let reopened = location.open().unwrap();
    for id in 1..=3 {
        let latest = reopened.latest_result(id).unwrap();
        assert_eq!(latest.result_id, id);
        assert_eq!(latest.discount_rate, ModelConfig::default().discount_rate);
        assert!(latest.irr_converged);
    }
    let err = run_and_store(&mut location.open().unwrap(), 42).unwrap_err();
    assert_eq!(err.to_string(), "Not found: no project for project_id=42");

    let _ = std::fs::remove_dir_all(&dir);
}
