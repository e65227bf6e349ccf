//! Formatted terminal output.
//!
//! Formatting lives in one place so output changes stay localized and the
//! summary can be snapshot-tested.

use std::path::PathBuf;

use crate::domain::AlignedTable;
use crate::report::table_stats;

/// Format the run summary (window, regime counts, latest row, artifacts).
pub fn format_run_summary(table: &AlignedTable, artifacts: &[PathBuf]) -> String {
    let stats = table_stats(table);
    let window = table.window();
    let mut out = String::new();

    out.push_str("=== fedfunds - Federal funds effective and target rate (FRED) ===\n");
    out.push_str(&format!("Window: {} .. {}\n", window.beg, window.end));
    out.push_str(&format!(
        "Rows: n={} | point target={} | range target={} | no target={} | in recession={}\n",
        stats.rows, stats.point_rows, stats.range_rows, stats.no_target_rows, stats.recession_rows
    ));

    if let Some(last) = table.last() {
        out.push_str(&format!(
            "Latest ({}): effective={} | target={} | range={}{}\n",
            last.date,
            fmt_rate(last.effective_rate),
            fmt_rate(last.target_rate()),
            match (last.target_lower(), last.target_upper()) {
                (Some(lo), Some(hi)) => format!("[{lo:.3}, {hi:.3}]"),
                _ => "-".to_string(),
            },
            if last.in_recession { " | recession" } else { "" },
        ));
    }

    if !artifacts.is_empty() {
        out.push_str("\nArtifacts:\n");
        for path in artifacts {
            out.push_str(&format!("- {}\n", path.display()));
        }
    }

    out
}

fn fmt_rate(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}
