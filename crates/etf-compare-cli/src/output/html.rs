//! Self-contained HTML report with Chart.js charts.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use etf_compare_core::comparison::{ComparisonReport, ReportRow};
use etf_compare_core::source::HistoryQuery;

const STYLE: &str = "\
body{font-family:Arial,Helvetica,sans-serif;background:#f6f7fb;color:#1b1b1b;margin:0;padding:24px}
.wrap{max-width:1200px;margin:0 auto}
h1{margin:0 0 8px 0}
.meta{color:#555;margin-bottom:16px}
.cards{display:grid;grid-template-columns:repeat(auto-fit,minmax(220px,1fr));gap:12px;margin:16px 0 24px 0}
.card{background:#fff;border-radius:10px;padding:14px;border:1px solid #e3e5ee}
.card .label{color:#666;font-size:12px;text-transform:uppercase}
.card .value{font-size:20px;font-weight:700;margin-top:6px}
canvas{background:#fff;border-radius:10px;border:1px solid #e3e5ee;padding:12px}
table{width:100%;border-collapse:collapse;background:#fff;border:1px solid #e3e5ee;margin-top:20px}
th,td{padding:8px 10px;border-bottom:1px solid #eef0f5;text-align:right;font-size:13px}
th:first-child,td:first-child{text-align:left}
thead{background:#f0f3fb}
";

/// Write the report to `path` and return its absolute location.
pub fn write_html_report(
    path: &str,
    report: &ComparisonReport,
    query: &HistoryQuery,
) -> io::Result<PathBuf> {
    let p = Path::new(path);
    let abs_path = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    let mut w = BufWriter::new(File::create(&abs_path)?);
    render(&mut w, report, query)?;
    w.flush()?;
    Ok(abs_path)
}

/// Render the full page.
pub fn render<W: Write>(w: &mut W, report: &ComparisonReport, query: &HistoryQuery) -> io::Result<()> {
    let etf = escape(&report.etf_symbol);
    let index = escape(&report.index_symbol);
    let s = &report.summary;
    let cfg = &report.config;

    writeln!(w, "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(w, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    writeln!(w, "<title>{} vs {}</title>", etf, index)?;
    writeln!(w, "<script src=\"https://cdn.jsdelivr.net/npm/chart.js\"></script>")?;
    writeln!(w, "<style>\n{}</style>\n</head>\n<body>\n<div class=\"wrap\">", STYLE)?;
    writeln!(w, "<h1>ETF vs Index</h1>")?;
    writeln!(
        w,
        "<div class=\"meta\">ETF: {} | Index: {} | Start: {} | Interval: {}</div>",
        etf,
        index,
        query.start,
        escape(&query.interval)
    )?;

    writeln!(w, "<div class=\"cards\">")?;
    card(w, "Win rate", &format!("{}/{}", s.wins, s.valid_periods))?;
    card(w, "Avg alpha", &format!("{:.5}", s.mean_alpha))?;
    if let Some(te) = s.tracking_error {
        card(w, "Tracking error", &format!("{:.5}", te))?;
    }
    card(w, "Life ETF weight", &format!("{:.2}", cfg.fixed_weight))?;
    card(
        w,
        "Glide start/end",
        &format!("{:.2} &rarr; {:.2}", cfg.glide_start, cfg.glide_end),
    )?;
    writeln!(w, "</div>")?;

    writeln!(w, "<canvas id=\"cumChart\" height=\"120\"></canvas>")?;
    writeln!(w, "<div style=\"height:16px\"></div>")?;
    writeln!(w, "<canvas id=\"alphaChart\" height=\"90\"></canvas>")?;

    write_table(w, &report.rows)?;
    write_script(w, &report.rows)?;

    writeln!(w, "</div>\n</body>\n</html>")
}

fn card<W: Write>(w: &mut W, label: &str, value: &str) -> io::Result<()> {
    writeln!(
        w,
        "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
        label, value
    )
}

fn write_table<W: Write>(w: &mut W, rows: &[ReportRow]) -> io::Result<()> {
    writeln!(w, "<table>\n<thead><tr>")?;
    writeln!(
        w,
        "<th>Date</th><th>ETF</th><th>Index</th><th>Alpha</th><th>LifeStrategy</th><th>GlidePath</th><th>GlideETF</th>"
    )?;
    writeln!(w, "</tr></thead>\n<tbody>")?;
    for r in rows {
        writeln!(
            w,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.5}</td><td>{:.2}</td><td>{:.2}</td><td>{:.4}</td></tr>",
            r.month, r.etf, r.index, r.alpha, r.fixed_blend, r.glide_blend, r.glide_weight
        )?;
    }
    writeln!(w, "</tbody>\n</table>")
}

/// A JS array literal; non-finite values become `null` gaps in the chart.
fn js_array<I: IntoIterator<Item = f64>>(values: I, decimals: usize) -> String {
    let items: Vec<String> = values
        .into_iter()
        .map(|v| {
            if v.is_finite() {
                format!("{:.*}", decimals, v)
            } else {
                "null".to_string()
            }
        })
        .collect();
    format!("[{}]", items.join(","))
}

fn write_script<W: Write>(w: &mut W, rows: &[ReportRow]) -> io::Result<()> {
    let labels: Vec<String> = rows.iter().map(|r| format!("\"{}\"", r.month)).collect();

    writeln!(w, "<script>")?;
    writeln!(w, "const labels = [{}];", labels.join(","))?;
    writeln!(w, "const etfData = {};", js_array(rows.iter().map(|r| r.etf), 2))?;
    writeln!(w, "const indexData = {};", js_array(rows.iter().map(|r| r.index), 2))?;
    writeln!(w, "const lifeData = {};", js_array(rows.iter().map(|r| r.fixed_blend), 2))?;
    writeln!(w, "const glideData = {};", js_array(rows.iter().map(|r| r.glide_blend), 2))?;
    writeln!(w, "const alphaData = {};", js_array(rows.iter().map(|r| r.alpha), 5))?;

    let series = [
        ("ETF", "etfData", "#1f77b4", "rgba(31,119,180,0.1)"),
        ("Index", "indexData", "#ff7f0e", "rgba(255,127,14,0.1)"),
        ("LifeStrategy", "lifeData", "#2ca02c", "rgba(44,160,44,0.1)"),
        ("GlidePath", "glideData", "#9467bd", "rgba(148,103,189,0.1)"),
    ];
    let datasets: Vec<String> = series
        .iter()
        .map(|(label, data, border, fill)| {
            format!(
                "{{label:'{}',data:{},borderColor:'{}',backgroundColor:'{}',tension:0.2}}",
                label, data, border, fill
            )
        })
        .collect();

    writeln!(
        w,
        "new Chart(document.getElementById('cumChart'),{{type:'line',data:{{labels:labels,datasets:[{}]}},\
         options:{{plugins:{{legend:{{position:'bottom'}}}},scales:{{y:{{title:{{display:true,text:'Cumulative (base 100)'}}}}}}}}}});",
        datasets.join(",")
    )?;
    writeln!(
        w,
        "new Chart(document.getElementById('alphaChart'),{{type:'bar',data:{{labels:labels,datasets:[{{label:'Alpha',data:alphaData,\
         backgroundColor:'rgba(220,53,69,0.35)',borderColor:'#dc3545'}}]}},\
         options:{{plugins:{{legend:{{position:'bottom'}}}},scales:{{y:{{title:{{display:true,text:'Monthly alpha'}}}}}}}}}});"
    )?;
    writeln!(w, "</script>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
