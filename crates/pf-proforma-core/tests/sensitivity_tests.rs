#![cfg(feature = "sensitivity")]

use pf_proforma_core::proforma::{FinancingInputs, ModelConfig, ProjectInputs};
use pf_proforma_core::sensitivity::{run_sensitivity, SensitivityGrid};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn windy_plains() -> (ProjectInputs, FinancingInputs) {
    (
        ProjectInputs {
            capacity_mw: dec!(3),
            capex: dec!(3_600_000),
            opex_annual: dec!(30_000),
            ppa_price: dec!(0.04),
            degradation_pct: dec!(0.008),
            cf_year1: dec!(0.35),
            cod_year: None,
        },
        FinancingInputs {
            debt_pct: dec!(0.65),
            interest_rate: dec!(0.05),
            term_years: 10,
            tax_credit_pct: dec!(0.30),
        },
    )
}

#[test]
fn test_sweep_produces_45_rows_in_canonical_order() {
    let (p, f) = windy_plains();
    let out = run_sensitivity(&p, &f, &ModelConfig::default(), &SensitivityGrid::default()).unwrap();
    let rows = &out.result.rows;
    assert_eq!(rows.len(), 45);
    assert_eq!(out.result.evaluated, 45);

    let ppa = [dec!(0.90), dec!(0.95), dec!(1.00), dec!(1.05), dec!(1.10)];
    let capex = [dec!(0.90), dec!(1.00), dec!(1.10)];
    let debt = [dec!(0.55), dec!(0.65), dec!(0.75)];

    let mut i = 0;
    for pm in ppa {
        for cm in capex {
            for d in debt {
                assert_eq!(
                    (rows[i].ppa_mult, rows[i].capex_mult, rows[i].debt_pct),
                    (pm, cm, d),
                    "row {i} out of order"
                );
                i += 1;
            }
        }
    }
}

#[test]
fn test_sweep_perturbs_only_named_fields() {
    let (p, f) = windy_plains();
    let cfg = ModelConfig::default();
    let out = run_sensitivity(&p, &f, &cfg, &SensitivityGrid::default()).unwrap();

    // Highest PPA, lowest capex, lowest debt beats the base case on NPV
    let best = out.result.rows[4 * 9].result.as_ref().unwrap();
    let base = out.result.rows[2 * 9 + 3 + 1].result.as_ref().unwrap();
    assert!(best.npv > base.npv);
}

#[test]
fn test_more_debt_raises_levered_irr() {
    let (p, f) = windy_plains();
    let out = run_sensitivity(&p, &f, &ModelConfig::default(), &SensitivityGrid::default()).unwrap();
    let rows = &out.result.rows;
    for chunk in rows.chunks(3) {
        let low = chunk[0].result.as_ref().unwrap().irr;
        let high = chunk[2].result.as_ref().unwrap().irr;
        assert!(high > low, "IRR should rise with leverage: {low} -> {high}");
    }
}

#[test]
fn test_all_equity_base_clamps_low_debt_to_zero() {
    let (p, f) = windy_plains();
    let out = run_sensitivity(
        &p,
        &f.with_debt_pct(Decimal::ZERO),
        &ModelConfig::default(),
        &SensitivityGrid::default(),
    )
    .unwrap();
    for chunk in out.result.rows.chunks(3) {
        assert_eq!(chunk[0].debt_pct, Decimal::ZERO);
        assert_eq!(chunk[1].debt_pct, Decimal::ZERO);
        assert_eq!(chunk[2].debt_pct, dec!(0.10));
        assert_eq!(chunk[0].result.as_ref().unwrap().min_dscr, None);
        assert!(chunk[2].result.as_ref().unwrap().min_dscr.is_some());
    }
}

#[test]
fn test_custom_grid() {
    let (p, f) = windy_plains();
    let grid = SensitivityGrid {
        ppa_multipliers: vec![dec!(1.00)],
        capex_multipliers: vec![dec!(0.80), dec!(1.20)],
        ..SensitivityGrid::default()
    };
    let out = run_sensitivity(&p, &f, &ModelConfig::default(), &grid).unwrap();
    assert_eq!(out.result.rows.len(), 6);
}

#[test]
fn test_sweep_survives_extreme_financing() {
    let (p, mut f) = windy_plains();
    f.interest_rate = dec!(20);
    f.term_years = 25;
    let cfg = ModelConfig {
        discount_rate: dec!(20),
        ..ModelConfig::default()
    };
    let out = run_sensitivity(&p, &f, &cfg, &SensitivityGrid::default()).unwrap();
    assert_eq!(out.result.rows.len(), 45);
    assert_eq!(out.result.failed, 0);
}

#[test]
fn test_overflowing_capex_fails_only_its_rows() {
    let (mut p, f) = windy_plains();
    p.capex = Decimal::MAX;
    let out = run_sensitivity(&p, &f, &ModelConfig::default(), &SensitivityGrid::default()).unwrap();
    let rows = &out.result.rows;
    assert_eq!(rows.len(), 45);
    for row in rows.iter().filter(|r| r.capex_mult > Decimal::ONE) {
        assert!(row.error.as_deref().unwrap().contains("overflow"));
    }
}
