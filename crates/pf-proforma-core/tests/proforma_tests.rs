use pf_proforma_core::proforma::{
    build_cash_flows, evaluate_project, loan_schedule, run_proforma, FinancingInputs, ModelConfig,
    ProjectInputs,
};
use pf_proforma_core::time_value::{irr, npv, IRR_GUESS};
use pf_proforma_core::ProjectFinanceError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sunny_ridge() -> (ProjectInputs, FinancingInputs) {
    (
        ProjectInputs {
            capacity_mw: dec!(5),
            capex: dec!(4_500_000),
            opex_annual: dec!(25_000),
            ppa_price: dec!(0.03),
            degradation_pct: dec!(0.005),
            cf_year1: dec!(0.20),
            cod_year: Some(2026),
        },
        FinancingInputs {
            debt_pct: dec!(0.70),
            interest_rate: dec!(0.045),
            term_years: 12,
            tax_credit_pct: dec!(0.30),
        },
    )
}

// ===========================================================================
// Regression fixture: Sunny Ridge 5MW, default config
// ===========================================================================

#[test]
fn test_sunny_ridge_year_one() {
    let (p, f) = sunny_ridge();
    let cfs = build_cash_flows(&p, &f, &ModelConfig::default()).unwrap();

    assert_eq!(cfs.years[0].production_mwh, dec!(8760));
    assert_eq!(cfs.years[0].revenue, dec!(262_800));
    assert_eq!(cfs.equity, dec!(1_350_000));

    // Level payment on 3.15M at 4.5% over 12 years
    let payment = cfs.years[0].debt_service;
    assert!(
        (payment - dec!(345_448.4942)).abs() < dec!(0.0001),
        "Payment {}",
        payment
    );

    // 262,800 - 25,000 - payment - 0 tax + 180,000
    let cf1 = cfs.years[0].after_tax_cashflow;
    assert!(
        (cf1 - dec!(72_351.5058)).abs() < dec!(0.0001),
        "Year-1 after-tax cash flow {}",
        cf1
    );
}

#[test]
fn test_sunny_ridge_metrics() {
    let (p, f) = sunny_ridge();
    let result = run_proforma(&p, &f, &ModelConfig::default()).unwrap();

    assert!(result.irr_converged);
    assert!(
        (result.irr - dec!(0.0969988955)).abs() < dec!(0.0000001),
        "IRR {}",
        result.irr
    );
    assert!(
        (result.npv - dec!(327_371.7574)).abs() < dec!(0.001),
        "NPV {}",
        result.npv
    );
    assert_eq!(result.payback_year, Some(14));
    let dscr = result.min_dscr.unwrap();
    assert!(
        (dscr - dec!(0.6299567939)).abs() < dec!(0.0000001),
        "Min DSCR {}",
        dscr
    );
}

#[test]
fn test_sunny_ridge_all_equity() {
    let (p, f) = sunny_ridge();
    let result = run_proforma(&p, &f.with_debt_pct(Decimal::ZERO), &ModelConfig::default()).unwrap();
    assert!((result.irr - dec!(0.0720205637)).abs() < dec!(0.0000001));
    assert!((result.npv - dec!(-297_493.8100)).abs() < dec!(0.001));
    assert_eq!(result.payback_year, Some(12));
    assert_eq!(result.min_dscr, None);
}

#[test]
fn test_sunny_ridge_envelope_warns_on_low_dscr() {
    let (p, f) = sunny_ridge();
    let out = evaluate_project(&p, &f, &ModelConfig::default()).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("DSCR")));
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_npv_at_zero_is_undiscounted_sum() {
    let (p, f) = sunny_ridge();
    let cfs = build_cash_flows(&p, &f, &ModelConfig::default()).unwrap();
    let total: Decimal = cfs.series.iter().sum();
    assert_eq!(npv(Decimal::ZERO, &cfs.series).unwrap(), total);
}

#[test]
fn test_npv_at_irr_is_zero() {
    let (p, f) = sunny_ridge();
    for debt in [dec!(0), dec!(0.5), dec!(0.7)] {
        let cfs = build_cash_flows(&p, &f.with_debt_pct(debt), &ModelConfig::default()).unwrap();
        let est = irr(&cfs.series, IRR_GUESS).unwrap();
        assert!(est.converged);
        let residual = npv(est.rate, &cfs.series).unwrap();
        assert!(
            residual.abs() < dec!(0.0001),
            "debt {}: NPV at IRR = {}",
            debt,
            residual
        );
    }
}

#[test]
fn test_loan_fully_retired_in_final_year() {
    for (rate, term) in [(dec!(0.045), 12u32), (dec!(0.0), 10), (dec!(0.12), 25), (dec!(0.01), 1)] {
        let schedule = loan_schedule(dec!(3_150_000), rate, term).unwrap();
        assert_eq!(schedule.len(), term as usize);
        let last = schedule.last().unwrap();
        assert!(
            last.ending_balance.abs() < dec!(0.000001),
            "rate {} term {}: residual balance {}",
            rate,
            term,
            last.ending_balance
        );
    }
}

#[test]
fn test_min_dscr_positive_when_levered() {
    let (p, f) = sunny_ridge();
    let cfg = ModelConfig::default();
    for debt in [dec!(0.1), dec!(0.5), dec!(0.95)] {
        let result = run_proforma(&p, &f.with_debt_pct(debt), &cfg).unwrap();
        let dscr = result.min_dscr.expect("levered project has a DSCR");
        assert!(dscr > Decimal::ZERO);
    }
}

#[test]
fn test_invalid_config_rejected() {
    let (p, f) = sunny_ridge();
    let cfg = ModelConfig {
        project_life_years: 0,
        ..ModelConfig::default()
    };
    assert!(run_proforma(&p, &f, &cfg).is_err());
}

#[test]
fn test_negative_escalation_allowed() {
    let (p, f) = sunny_ridge();
    let cfg = ModelConfig {
        opex_escalation: dec!(-0.01),
        ..ModelConfig::default()
    };
    let cfs = build_cash_flows(&p, &f, &cfg).unwrap();
    assert_eq!(cfs.years[1].opex, dec!(24_750));
}

// ===========================================================================
// Extreme but valid inputs
// ===========================================================================

#[test]
fn test_extreme_discount_rate_discounts_to_equity() {
    let (p, f) = sunny_ridge();
    let cfg = ModelConfig {
        discount_rate: dec!(20),
        ..ModelConfig::default()
    };
    let result = run_proforma(&p, &f, &cfg).unwrap();
    // Only year 1 contributes visibly: 72,352 / 21 on top of -1,350,000
    assert!(
        result.npv > dec!(-1_350_000) && result.npv < dec!(-1_340_000),
        "npv {}",
        result.npv
    );
}

#[test]
fn test_extreme_interest_rate_runs() {
    let (p, mut f) = sunny_ridge();
    f.interest_rate = dec!(20);
    f.term_years = 25;
    let result = run_proforma(&p, &f, &ModelConfig::default()).unwrap();
    assert_eq!(result.payback_year, None);
    let dscr = result.min_dscr.expect("levered project has a DSCR");
    assert!(dscr > Decimal::ZERO && dscr < dec!(0.01), "dscr {dscr}");
}

#[test]
fn test_thousand_year_life_runs() {
    let (p, f) = sunny_ridge();
    let cfg = ModelConfig {
        project_life_years: 1000,
        ..ModelConfig::default()
    };
    let result = run_proforma(&p, &f, &cfg).unwrap();
    assert_eq!(build_cash_flows(&p, &f, &cfg).unwrap().series.len(), 1001);
    assert!(result.payback_year.is_some());
}

#[test]
fn test_unrepresentable_discount_rate_is_an_error() {
    let (p, f) = sunny_ridge();
    let cfg = ModelConfig {
        discount_rate: Decimal::MAX,
        ..ModelConfig::default()
    };
    let err = run_proforma(&p, &f, &cfg).unwrap_err();
    assert!(matches!(err, ProjectFinanceError::Overflow { .. }), "{err}");
}
