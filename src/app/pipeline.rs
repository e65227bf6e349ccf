//! Shared "build pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> resolve window -> align -> CSV table -> HTML chart -> raw snapshot
//!
//! The CLI can then focus on presentation (printing summaries and plots).

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::align::{Aligner, resolve_window};
use crate::chart::{ChartPayload, write_chart_html};
use crate::data::{FredClient, LocalSnapshot, RateSource, write_raw_snapshot};
use crate::domain::{AlignedTable, DateBound, RunConfig, Source};
use crate::error::AppError;
use crate::io::{chart_file_name, table_file_name, write_table_csv};

/// All outputs of a single `fedfunds build` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: AlignedTable,
    /// Last date present in the fetched data.
    pub snapshot_date: Option<NaiveDate>,
    pub raw_snapshot: Option<PathBuf>,
    pub table_path: PathBuf,
    pub chart_path: Option<PathBuf>,
}

impl RunOutput {
    /// Paths written by the run, in write order.
    pub fn artifacts(&self) -> Vec<PathBuf> {
        std::iter::once(&self.table_path)
            .chain(self.chart_path.iter())
            .chain(self.raw_snapshot.iter())
            .cloned()
            .collect()
    }
}

/// Execute the full pipeline against the source named in `config`.
pub fn run_build(config: &RunConfig) -> Result<RunOutput, AppError> {
    match config.source {
        Source::Download => {
            let client = FredClient::from_env()?;
            run_with_source(config, &client, &Aligner::default())
        }
        Source::Local => {
            let local = LocalSnapshot::new(config.data_dir());
            run_with_source(config, &local, &Aligner::default())
        }
    }
}

/// Execute the pipeline with an explicit source and aligner.
///
/// Nothing is written unless alignment succeeds.
pub fn run_with_source(
    config: &RunConfig,
    source: &dyn RateSource,
    aligner: &Aligner,
) -> Result<RunOutput, AppError> {
    // 1) Fetch the raw series.
    let fetched = source.fetch(config.end.date())?;

    if let Some((wanted, actual)) = data_end_lag(config.end, fetched.snapshot_date) {
        warn!(requested = %wanted, actual = %actual, "data ends before the requested end date");
    }

    // 2) Resolve sentinels and align.
    let window = resolve_window(config.beg, config.end, &fetched.inputs, config.floor)?;
    info!(beg = %window.beg, end = %window.end, "resolved window");
    let table = aligner.align(window, &fetched.inputs)?;

    // Artifacts are dated with the last aligned row, not the requested end.
    let data_dir = config.data_dir();
    let series_end = table.last().map_or(window.end, |row| row.date);

    // 3) Aligned table.
    let table_path = write_table_csv(&data_dir.join(table_file_name(series_end)), &table)?;

    // 4) Chart.
    let chart_path = if config.html {
        let path = config.images_dir().join(chart_file_name(series_end));
        let updated = fetched.snapshot_date.unwrap_or(series_end);
        let payload = ChartPayload::from_table(&table, aligner.recessions(), updated);
        write_chart_html(&path, &payload)?;
        Some(path)
    } else {
        None
    };

    // 5) Persist the raw download for later `--source local` runs.
    let raw_snapshot = match config.source {
        Source::Download => Some(write_raw_snapshot(&data_dir, &fetched.inputs)?),
        Source::Local => None,
    };

    Ok(RunOutput {
        table,
        snapshot_date: fetched.snapshot_date,
        raw_snapshot,
        table_path,
        chart_path,
    })
}

/// `(requested, actual)` when the data stops short of an explicit end date.
fn data_end_lag(end: DateBound, snapshot_date: Option<NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    match (end, snapshot_date) {
        (DateBound::On(wanted), Some(actual)) if actual < wanted => Some((wanted, actual)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn lag_is_reported_only_when_data_ends_early() {
        let end = DateBound::On(date(2024, 5, 4));
        assert_eq!(
            data_end_lag(end, Some(date(2024, 5, 3))),
            Some((date(2024, 5, 4), date(2024, 5, 3)))
        );
        assert_eq!(data_end_lag(end, Some(date(2024, 5, 4))), None);
        assert_eq!(data_end_lag(end, Some(date(2024, 5, 10))), None);
        assert_eq!(data_end_lag(DateBound::MostRecent, Some(date(2024, 5, 3))), None);
        assert_eq!(data_end_lag(end, None), None);
    }
}
