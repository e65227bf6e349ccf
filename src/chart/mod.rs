//! Interactive HTML chart of the aligned table.
//!
//! The output is a single self-contained file: the chart data is embedded as
//! a JSON document and drawn on a `<canvas>` by an inline script (`chart.js`)
//! that supports pan, zoom, hover tooltips and legend muting.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::align::{RecessionTable, ShadedRegion};
use crate::domain::{
    AlignedTable, SERIES_EFFECTIVE, SERIES_TARGET, SERIES_TARGET_LOWER, SERIES_TARGET_UPPER,
};
use crate::error::WriteError;
use crate::io::write_atomic;

const TEMPLATE: &str = include_str!("template.html");
const SCRIPT: &str = include_str!("chart.js");

/// One plotted line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub color: &'static str,
    pub width: f64,
    pub dashed: bool,
    /// Aligned with `ChartPayload::dates`; `None` breaks the line.
    pub values: Vec<Option<f64>>,
}

/// Everything the embedded script needs to draw the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub title: String,
    pub subtitle: String,
    pub source_note: String,
    pub x_label: String,
    pub y_label: String,
    pub file_stem: String,
    pub dates: Vec<NaiveDate>,
    pub series: Vec<ChartSeries>,
    pub regions: Vec<ShadedRegion>,
}

impl ChartPayload {
    /// Build the payload; `updated` is the date shown in the source line.
    pub fn from_table(table: &AlignedTable, recessions: &RecessionTable, updated: NaiveDate) -> Self {
        let window = table.window();
        let rows = table.rows();
        let column = |f: fn(&crate::domain::AlignedRow) -> Option<f64>| rows.iter().map(f).collect::<Vec<_>>();

        let series = vec![
            ChartSeries {
                name: "Effective rate".to_string(),
                color: "#1f77b4",
                width: 2.0,
                dashed: false,
                values: column(|r| r.effective_rate),
            },
            ChartSeries {
                name: "Target rate".to_string(),
                color: "#d62728",
                width: 2.0,
                dashed: false,
                values: column(|r| r.target_rate()),
            },
            ChartSeries {
                name: "Target lower".to_string(),
                color: "#ff7f0e",
                width: 1.5,
                dashed: true,
                values: column(|r| r.target_lower()),
            },
            ChartSeries {
                name: "Target upper".to_string(),
                color: "#2ca02c",
                width: 1.5,
                dashed: true,
                values: column(|r| r.target_upper()),
            },
        ];

        Self {
            title: "Federal funds rate: effective and target".to_string(),
            subtitle: format!("{} to {}, recessions shaded", window.beg, window.end),
            source_note: format!(
                "Source: FRED ({SERIES_EFFECTIVE}, {SERIES_TARGET}, {SERIES_TARGET_LOWER}, {SERIES_TARGET_UPPER}), updated {}.",
                updated.format("%B %-d, %Y")
            ),
            x_label: "Date".to_string(),
            y_label: "Percent".to_string(),
            file_stem: format!("fedfunds_{}", table.last().map_or(window.end, |r| r.date)),
            dates: rows.iter().map(|r| r.date).collect(),
            series,
            regions: recessions.shaded_regions(window),
        }
    }
}

/// Render the self-contained HTML document.
pub fn render_html(payload: &ChartPayload) -> Result<String, serde_json::Error> {
    let json = embed_json(&serde_json::to_string(payload)?);
    Ok(TEMPLATE
        .replace("{{TITLE}}", &escape_html(&payload.title))
        .replace("{{SUBTITLE}}", &escape_html(&payload.subtitle))
        .replace("{{SOURCE}}", &escape_html(&payload.source_note))
        .replace("{{SCRIPT}}", SCRIPT)
        .replace("{{DATA}}", &json))
}

/// Render and write the chart to `path`.
pub fn write_chart_html(path: &Path, payload: &ChartPayload) -> Result<(), WriteError> {
    let html = render_html(payload).map_err(|e| WriteError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_atomic(path, html.as_bytes())?;
    info!(path = %path.display(), points = payload.dates.len(), "wrote chart");
    Ok(())
}

/// Make JSON safe to place inside a `<script>` element.
///
/// `<` only appears inside JSON strings, where `<` is an equivalent
/// escape, so no `</script>` sequence can survive.
fn embed_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

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
