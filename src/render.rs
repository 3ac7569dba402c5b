// =============================================================================
// Table Renderer — RunReport -> HTML
// =============================================================================
//
// Produces a striped HTML table with one row per instrument:
//
//   Stock | Current Price | % Change | RSI | SMA(50) | SMA(100) | SMA(200) | Signal
//
// Prices carry the configured currency prefix, percentages a trailing `%`,
// and unavailable metrics render their sentinel text.  The fragment is what
// gets persisted to the output file; `render_page` wraps it for serving.
// =============================================================================

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::types::{IndicatorRecord, Metric};

const COLUMNS: [&str; 8] = [
    "Stock",
    "Current Price",
    "% Change",
    "RSI",
    "SMA(50)",
    "SMA(100)",
    "SMA(200)",
    "Signal",
];

// =============================================================================
// Cell formatting
// =============================================================================

pub fn format_price(metric: Metric, currency: &str) -> String {
    match metric {
        Metric::Value(v) => format!("{currency}{v:.2}"),
        Metric::Unavailable(reason) => reason.sentinel().to_string(),
    }
}

pub fn format_percent(metric: Metric) -> String {
    match metric {
        Metric::Value(v) => format!("{v:.2}%"),
        Metric::Unavailable(reason) => reason.sentinel().to_string(),
    }
}

pub fn format_plain(metric: Metric) -> String {
    match metric {
        Metric::Value(v) => format!("{v:.2}"),
        Metric::Unavailable(reason) => reason.sentinel().to_string(),
    }
}

/// Display cells of one record, in column order.
pub fn row_cells(record: &IndicatorRecord, currency: &str) -> [String; 8] {
    [
        record.symbol.clone(),
        format_price(record.price, currency),
        format_percent(record.change_pct),
        format_plain(record.rsi),
        format_price(record.sma_50, currency),
        format_price(record.sma_100, currency),
        format_price(record.sma_200, currency),
        record.signal.to_string(),
    ]
}

// =============================================================================
// HTML
// =============================================================================

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the records as a `table table-striped` HTML fragment.
pub fn render_table(records: &[IndicatorRecord], currency: &str) -> String {
    // `write!` into a String cannot fail.
    let mut html = String::new();
    html.push_str("<table border=\"1\" class=\"dataframe table table-striped\">\n");
    html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
    for col in COLUMNS {
        let _ = writeln!(html, "      <th>{}</th>", escape_html(col));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for record in records {
        html.push_str("    <tr>\n");
        for cell in row_cells(record, currency) {
            let _ = writeln!(html, "      <td>{}</td>", escape_html(&cell));
        }
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n</table>");
    html
}

/// Wrap a table fragment in a minimal standalone page.
pub fn render_page(table: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  \
         <title>Optimist.Trader</title>\n</head>\n<body>\n  <h1>Optimist.Trader</h1>\n{table}\n</body>\n</html>\n"
    )
}

// =============================================================================
// Persistence
// =============================================================================

/// Write `contents` to `path` atomically (write to `.tmp`, then rename),
/// creating parent directories as needed.
pub fn write_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    std::fs::write(tmp_path, contents)
        .with_context(|| format!("failed to write tmp output to {}", tmp_path.display()))?;

    if let Err(e) = std::fs::rename(tmp_path, path) {
        let _ = std::fs::remove_file(tmp_path);
        return Err(e)
            .with_context(|| format!("failed to rename tmp output to {}", path.display()));
    }

    info!(path = %path.display(), bytes = contents.len(), "stock table written (atomic)");
    Ok(())
}
