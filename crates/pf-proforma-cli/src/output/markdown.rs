use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use pf_proforma_core::store::{ProjectRecord, ResultRow};
use pf_proforma_core::Rate;

/// Render the investment summary for a project's latest stored run.
pub fn render_summary(project: &ProjectRecord, result: &ResultRow) -> String {
    let p = &project.inputs;
    let mut md = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(md, "# {} – Investment Summary\n", project.name);
    let _ = writeln!(
        md,
        "**Run date:** {}\n",
        result.run_date.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let _ = writeln!(md, "## Key Assumptions");
    let _ = writeln!(md, "- Location: {}", project.location.as_deref().unwrap_or("N/A"));
    let _ = writeln!(
        md,
        "- COD Year: {}",
        p.cod_year.map_or_else(|| "N/A".to_string(), |y| y.to_string())
    );
    let _ = writeln!(md, "- Capacity: {} MW", p.capacity_mw);
    let _ = writeln!(md, "- Capacity Factor (Year 1): {}", fmt_pct(p.cf_year1));
    let _ = writeln!(md, "- Capex: {}", fmt_money(p.capex));
    let _ = writeln!(md, "- Opex (Year 1): {} / year", fmt_money(p.opex_annual));
    let _ = writeln!(md, "- PPA Price: ${:.4} / kWh", p.ppa_price.round_dp(4));
    let _ = writeln!(md, "- Degradation: {} per year\n", fmt_pct(p.degradation_pct));

    let _ = writeln!(md, "## Financial Results");
    let _ = write!(md, "- Levered IRR: {}", fmt_pct(result.irr));
    if !result.irr_converged {
        let _ = write!(md, " (approximate; solver did not converge)");
    }
    md.push('\n');
    let _ = writeln!(
        md,
        "- NPV ({}% discount): {}",
        (result.discount_rate * Decimal::ONE_HUNDRED).normalize(),
        fmt_money(result.npv)
    );
    match result.payback_year {
        Some(year) => {
            let _ = writeln!(md, "- Simple Payback: Year {}", year);
        }
        None => {
            let _ = writeln!(md, "- Simple Payback: N/A");
        }
    }
    match result.min_dscr {
        Some(dscr) => {
            let _ = writeln!(md, "- Min DSCR (loan term): {:.2}", dscr.round_dp(2));
        }
        None => {
            let _ = writeln!(md, "- Min DSCR (loan term): N/A");
        }
    }

    md
}

/// Write `project_<id>_summary.md` under `dir`, creating it if needed.
pub fn write_summary(dir: &Path, project_id: i64, contents: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("project_{}_summary.md", project_id));
    fs::write(&path, contents)?;
    Ok(path)
}

/// 0.0970 -> "9.70%"
fn fmt_pct(rate: Rate) -> String {
    format!("{:.2}%", (rate * Decimal::ONE_HUNDRED).round_dp(2))
}

/// Whole dollars with thousands separators: -297493.81 -> "-$297,494"
fn fmt_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(0);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
