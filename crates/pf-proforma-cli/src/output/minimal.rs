use serde_json::Value;

/// Headline fields, most important first.
const PRIORITY_KEYS: [&str; 5] = ["irr", "npv", "summary_path", "csv_path", "store"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_value(value));
}

fn minimal_value(value: &Value) -> String {
    let envelope = value.as_object();
    let result_obj = envelope.and_then(|m| m.get("result")).unwrap_or(value);

    // Evaluate nests the headline numbers under `metrics`
    let result_obj = result_obj.get("metrics").unwrap_or(result_obj);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
