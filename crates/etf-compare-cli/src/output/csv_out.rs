use etf_compare_core::comparison::ReportRow;
use serde_json::Value;
use std::io;

/// Column headers of the comparison report.
pub const REPORT_HEADERS: [&str; 7] = [
    "Date",
    "ETF",
    "Index",
    "Alpha",
    "LifeStrategy",
    "GlidePath",
    "GlideEtfWeight",
];

/// Write comparison rows as CSV: cumulative values at 2 dp, alpha at 5 dp,
/// glide weight at 4 dp.
pub fn write_report_csv<W: io::Write>(writer: W, rows: &[ReportRow]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(REPORT_HEADERS)?;
    for r in rows {
        wtr.write_record([
            r.month.to_string(),
            format!("{:.2}", r.etf),
            format!("{:.2}", r.index),
            format!("{:.5}", r.alpha),
            format!("{:.2}", r.fixed_blend),
            format!("{:.2}", r.glide_blend),
            format!("{:.4}", r.glide_weight),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();

    if let Some(rows) = find_rows(value) {
        if let Ok(report_rows) = serde_json::from_value::<Vec<ReportRow>>(rows.clone()) {
            if let Err(e) = write_report_csv(stdout.lock(), &report_rows) {
                eprintln!("CSV write error: {}", e);
            }
            return;
        }
        if let Value::Array(arr) = rows {
            let mut wtr = csv::Writer::from_writer(stdout.lock());
            write_array_csv(&mut wtr, arr);
            let _ = wtr.flush();
            return;
        }
    }

    let mut wtr = csv::Writer::from_writer(stdout.lock());
    match value {
        Value::Object(map) => {
            let fields = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in field_records(fields) {
                let _ = wtr.write_record([key, val]);
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

/// The `rows` table of a result, enveloped or not.
pub(crate) fn find_rows(value: &Value) -> Option<&Value> {
    value
        .get("result")
        .and_then(|r| r.get("rows"))
        .or_else(|| value.get("rows"))
        .filter(|rows| rows.is_array())
}

/// Scalar fields, with nested sections flattened to `section.key`. Arrays are
/// left out.
fn field_records(fields: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    let mut records = Vec::new();
    for (key, val) in fields {
        match val {
            Value::Array(_) => {}
            Value::Object(section) => {
                for (sub_key, sub_val) in section {
                    if !sub_val.is_array() {
                        records.push((format!("{}.{}", key, sub_key), format_csv_value(sub_val)));
                    }
                }
            }
            _ => records.push((key.clone(), format_csv_value(val))),
        }
    }
    records
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Extract headers from first object
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
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
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
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
