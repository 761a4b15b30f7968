use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pf_proforma_core::sensitivity::SensitivityRow;

/// Column order of the sensitivity export.
pub const SENSITIVITY_COLUMNS: [&str; 7] = [
    "ppa_mult",
    "capex_mult",
    "debt_pct",
    "irr",
    "npv",
    "payback_year",
    "min_dscr",
];

/// One exported grid point. Failed points keep their coordinates and leave
/// the metric cells empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityCsvRow {
    pub ppa_mult: Decimal,
    pub capex_mult: Decimal,
    pub debt_pct: Decimal,
    pub irr: Option<Decimal>,
    pub npv: Option<Decimal>,
    pub payback_year: Option<u32>,
    pub min_dscr: Option<Decimal>,
}

impl From<&SensitivityRow> for SensitivityCsvRow {
    fn from(row: &SensitivityRow) -> Self {
        let m = row.result.as_ref();
        Self {
            ppa_mult: row.ppa_mult,
            capex_mult: row.capex_mult,
            debt_pct: row.debt_pct,
            irr: m.map(|m| m.irr.round_dp(6)),
            npv: m.map(|m| m.npv.round_dp(2)),
            payback_year: m.and_then(|m| m.payback_year),
            min_dscr: m.and_then(|m| m.min_dscr).map(|d| d.round_dp(4)),
        }
    }
}

/// Serialise sweep rows, header first, in grid order.
pub fn write_sensitivity_csv<W: io::Write>(rows: &[SensitivityRow], writer: W) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(SENSITIVITY_COLUMNS)?;
    for row in rows {
        wtr.serialize(SensitivityCsvRow::from(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `sensitivity_project_<id>.csv` under `dir`, creating it if needed.
pub fn export_sensitivity_csv(
    dir: &Path,
    project_id: i64,
    rows: &[SensitivityRow],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create '{}': {}", dir.display(), e))?;
    let path = dir.join(format!("sensitivity_project_{}.csv", project_id));
    let file = fs::File::create(&path)
        .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))?;
    write_sensitivity_csv(rows, io::BufWriter::new(file))?;
    Ok(path)
}

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in result {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            } else if let Some(Value::Array(results)) = map.get("results") {
                write_array_csv(&mut wtr, results);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    let headers = column_order(first);
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

/// Sweep rows keep the export column order; anything else uses the object's keys.
pub(crate) fn column_order(first: &serde_json::Map<String, Value>) -> Vec<&str> {
    if SENSITIVITY_COLUMNS.iter().all(|c| first.contains_key(*c)) {
        SENSITIVITY_COLUMNS.to_vec()
    } else {
        first.keys().map(|k| k.as_str()).collect()
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
