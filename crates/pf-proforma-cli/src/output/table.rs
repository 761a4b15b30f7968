use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::csv_out::column_order;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if let Some(Value::Array(rows)) = map.get("results") {
                print_array_table(rows);
                print_trailer(map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    if let Value::Object(res_map) = result {
        println!("{}", field_table(res_map));
    } else {
        print_flat_object(&Value::Object(envelope.clone()));
    }
    print_trailer(envelope);
}

/// Warnings and methodology lines after the main table.
fn print_trailer(envelope: &Map<String, Value>) {
    if let Some(Value::String(path)) = envelope.get("csv_path") {
        println!("\nCSV: {}", path);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        println!("{}", field_table(map));
    }
}

fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    builder.build()
}

fn print_array_table(arr: &[Value]) {
    let Some(first) = arr.first() else {
        println!("(empty)");
        return;
    };

    if let Value::Object(first) = first {
        let headers = column_order(first);
        let mut builder = Builder::default();
        builder.push_record(headers.iter().copied());

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", builder.build());
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "N/A".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
