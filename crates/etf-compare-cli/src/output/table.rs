use etf_compare_core::comparison::ReportRow;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::csv_out::REPORT_HEADERS;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_tables(result, map);
            } else {
                print_result_tables(value, map);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_tables(result: &Value, envelope: &serde_json::Map<String, Value>) {
    let Value::Object(res_map) = result else {
        println!("{}", result);
        return;
    };

    if let Some(rows) = res_map.get("rows") {
        match serde_json::from_value::<Vec<ReportRow>>(rows.clone()) {
            Ok(report_rows) => print_report_rows(&report_rows),
            Err(_) => {
                if let Value::Array(arr) = rows {
                    print_array_table(arr);
                }
            }
        }
    }

    // Scalar fields plus the nested summary and outcome sections
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in res_map {
        match val {
            Value::Array(_) => {}
            Value::Object(section) => {
                for (sub_key, sub_val) in section {
                    builder.push_record([format!("{}.{}", key, sub_key), format_value(sub_val)]);
                }
            }
            _ => builder.push_record([key.clone(), format_value(val)]),
        }
    }
    println!("{}", Table::from(builder));

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

fn print_report_rows(rows: &[ReportRow]) {
    let mut builder = Builder::default();
    builder.push_record(REPORT_HEADERS);
    for r in rows {
        builder.push_record([
            r.month.to_string(),
            format!("{:.2}", r.etf),
            format!("{:.2}", r.index),
            format!("{:.5}", r.alpha),
            format!("{:.2}", r.fixed_blend),
            format!("{:.2}", r.glide_blend),
            format!("{:.4}", r.glide_weight),
        ]);
    }
    println!("{}\n", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}\n", Table::from(builder));
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
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
