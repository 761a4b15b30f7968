use rust_decimal_macros::dec;

use super::records::{FinancingRecord, ProjectRecord, StoreSnapshot};
use crate::proforma::{FinancingInputs, ProjectInputs};

/// Sample portfolio: one solar and one wind site plus a larger solar build.
pub fn seed_snapshot() -> StoreSnapshot {
    let projects = vec![
        ProjectRecord {
            project_id: 1,
            name: "Sunny Ridge 5MW".into(),
            location: Some("AZ".into()),
            inputs: ProjectInputs {
                capacity_mw: dec!(5.0),
                capex: dec!(4_500_000),
                opex_annual: dec!(25_000),
                ppa_price: dec!(0.030),
                degradation_pct: dec!(0.005),
                cf_year1: dec!(0.20),
                cod_year: Some(2026),
            },
        },
        ProjectRecord {
            project_id: 2,
            name: "Windy Plains 3MW".into(),
            location: Some("CO".into()),
            inputs: ProjectInputs {
                capacity_mw: dec!(3.0),
                capex: dec!(3_600_000),
                opex_annual: dec!(30_000),
                ppa_price: dec!(0.040),
                degradation_pct: dec!(0.008),
                cf_year1: dec!(0.35),
                cod_year: Some(2025),
            },
        },
        ProjectRecord {
            project_id: 3,
            name: "Desert Bloom 10MW".into(),
            location: Some("TX".into()),
            inputs: ProjectInputs {
                capacity_mw: dec!(10.0),
                capex: dec!(8_000_000),
                opex_annual: dec!(80_000),
                ppa_price: dec!(0.028),
                degradation_pct: dec!(0.004),
                cf_year1: dec!(0.22),
                cod_year: Some(2027),
            },
        },
    ];

    let financing = vec![
        FinancingRecord {
            financing_id: 1,
            project_id: 1,
            inputs: FinancingInputs {
                debt_pct: dec!(0.70),
                interest_rate: dec!(0.045),
                term_years: 12,
                tax_credit_pct: dec!(0.30),
            },
        },
        FinancingRecord {
            financing_id: 2,
            project_id: 2,
            inputs: FinancingInputs {
                debt_pct: dec!(0.65),
                interest_rate: dec!(0.050),
                term_years: 10,
                tax_credit_pct: dec!(0.30),
            },
        },
        FinancingRecord {
            financing_id: 3,
            project_id: 3,
            inputs: FinancingInputs {
                debt_pct: dec!(0.65),
                interest_rate: dec!(0.0475),
                term_years: 12,
                tax_credit_pct: dec!(0.30),
            },
        },
    ];

    StoreSnapshot {
        projects,
        financing,
        results: Vec::new(),
    }
}
