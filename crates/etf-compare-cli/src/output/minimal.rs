use serde_json::Value;

/// Key answer fields, in order of priority.
const PRIORITY_KEYS: [&str; 4] = ["mean_alpha", "win_rate", "tracking_error", "months"];

/// Print just the key answer value from the output.
///
/// Looks for a priority field in the result, then in its `summary` section,
/// then falls back to the first field of the result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let sections = [Some(result_obj), result_obj.get("summary")];
    for key in &PRIORITY_KEYS {
        for section in sections.iter().flatten() {
            if let Some(val) = section.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
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
