//! Raw snapshot files: the downloaded series saved as one wide CSV.
//!
//! File name: `fedfunds_raw_<YYYY-MM-DD>.csv`, dated with the last observation
//! it contains. Columns: `date,DFF,DFEDTAR,DFEDTARL,DFEDTARU`, empty cells for
//! dates a series does not report.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::{RateSource, RawFetch};
use crate::domain::{
    RangeSeries, RateInputs, RawSeries, SERIES_EFFECTIVE, SERIES_TARGET, SERIES_TARGET_LOWER,
    SERIES_TARGET_UPPER,
};
use crate::error::{FetchError, WriteError};
use crate::io::write_atomic;

const PREFIX: &str = "fedfunds_raw_";
const SUFFIX: &str = ".csv";

pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("{PREFIX}{date}{SUFFIX}")
}

fn snapshot_date_from_name(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRecord {
    date: NaiveDate,
    #[serde(rename = "DFF")]
    effective: Option<f64>,
    #[serde(rename = "DFEDTAR")]
    target: Option<f64>,
    #[serde(rename = "DFEDTARL")]
    target_lower: Option<f64>,
    #[serde(rename = "DFEDTARU")]
    target_upper: Option<f64>,
}

/// Save raw inputs to `<dir>/fedfunds_raw_<last date>.csv`.
pub fn write_raw_snapshot(dir: &Path, inputs: &RateInputs) -> Result<PathBuf, WriteError> {
    let date = inputs.last_date().ok_or_else(|| WriteError::Encode {
        path: dir.to_path_buf(),
        message: "cannot snapshot empty series".to_string(),
    })?;
    let path = dir.join(snapshot_file_name(date));

    let mut rows: BTreeMap<NaiveDate, SnapshotRecord> = BTreeMap::new();
    for p in inputs.effective.points() {
        entry(&mut rows, p.date).effective = Some(p.value);
    }
    for p in inputs.target_point.points() {
        entry(&mut rows, p.date).target = Some(p.value);
    }
    for p in inputs.target_range.points() {
        let rec = entry(&mut rows, p.date);
        rec.target_lower = Some(p.lower);
        rec.target_upper = Some(p.upper);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for rec in rows.values() {
        writer.serialize(rec).map_err(|e| WriteError::Encode {
            path: path.clone(),
            message: e.to_string(),
        })?;
    }
    let bytes = writer.into_inner().map_err(|e| WriteError::Encode {
        path: path.clone(),
        message: e.to_string(),
    })?;

    write_atomic(&path, &bytes)?;
    info!(path = %path.display(), rows = rows.len(), "wrote raw snapshot");
    Ok(path)
}

fn entry(rows: &mut BTreeMap<NaiveDate, SnapshotRecord>, date: NaiveDate) -> &mut SnapshotRecord {
    rows.entry(date).or_insert_with(|| SnapshotRecord {
        date,
        effective: None,
        target: None,
        target_lower: None,
        target_upper: None,
    })
}

/// Read a raw snapshot file back into rate inputs.
pub fn read_raw_snapshot(path: &Path) -> Result<RateInputs, FetchError> {
    let file = File::open(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut effective = Vec::new();
    let mut target = Vec::new();
    let mut lower = Vec::new();
    let mut upper = Vec::new();

    for (idx, record) in reader.deserialize::<SnapshotRecord>().enumerate() {
        let rec = record.map_err(|e| FetchError::Snapshot {
            path: path.to_path_buf(),
            // +2: one for the header, one for 1-based line numbers.
            message: format!("line {}: {e}", idx + 2),
        })?;
        let push = |out: &mut Vec<(NaiveDate, f64)>, v: Option<f64>| {
            if let Some(v) = v.filter(|v| v.is_finite()) {
                out.push((rec.date, v));
            }
        };
        push(&mut effective, rec.effective);
        push(&mut target, rec.target);
        push(&mut lower, rec.target_lower);
        push(&mut upper, rec.target_upper);
    }

    let lower = RawSeries::from_observations(SERIES_TARGET_LOWER, lower);
    let upper = RawSeries::from_observations(SERIES_TARGET_UPPER, upper);
    Ok(RateInputs {
        effective: RawSeries::from_observations(SERIES_EFFECTIVE, effective),
        target_point: RawSeries::from_observations(SERIES_TARGET, target),
        target_range: RangeSeries::from_bounds(&lower, &upper),
    })
}

/// Reads raw snapshots previously saved under a data directory.
#[derive(Debug, Clone)]
pub struct LocalSnapshot {
    dir: PathBuf,
}

impl LocalSnapshot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Pick the snapshot to read.
    ///
    /// - explicit end: the latest snapshot dated on or before `end` (downloads
    ///   are dated with their last observation, which lags the request), else
    ///   the earliest one dated after it
    /// - no end: the latest snapshot
    pub fn locate(&self, end: Option<NaiveDate>) -> Result<PathBuf, FetchError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| FetchError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut candidates: Vec<(NaiveDate, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                let date = snapshot_date_from_name(name.to_str()?)?;
                Some((date, entry.path()))
            })
            .collect();
        candidates.sort();

        let chosen = match end {
            Some(end) => {
                let split = candidates.partition_point(|(date, _)| *date <= end);
                if split > 0 {
                    Some(candidates.swap_remove(split - 1))
                } else {
                    candidates.into_iter().next()
                }
            }
            None => candidates.pop(),
        };

        chosen.map(|(_, path)| path).ok_or_else(|| FetchError::SnapshotNotFound {
            dir: self.dir.clone(),
            wanted: match end {
                Some(end) => format!("for end date {end}"),
                None => "of any date".to_string(),
            },
        })
    }
}

impl RateSource for LocalSnapshot {
    fn fetch(&self, end: Option<NaiveDate>) -> Result<RawFetch, FetchError> {
        let path = self.locate(end)?;
        info!(path = %path.display(), "reading raw snapshot");
        Ok(RawFetch::new(read_raw_snapshot(&path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inputs() -> RateInputs {
        RateInputs {
            effective: RawSeries::from_observations(
                SERIES_EFFECTIVE,
                vec![(date(2008, 12, 15), 0.12), (date(2008, 12, 16), 0.16)],
            ),
            target_point: RawSeries::from_observations(SERIES_TARGET, vec![(date(2008, 12, 15), 1.0)]),
            target_range: RangeSeries::from_points(vec![(date(2008, 12, 16), 0.0, 0.25)]),
        }
    }

    #[test]
    fn file_names_encode_the_snapshot_date() {
        assert_eq!(snapshot_file_name(date(2024, 5, 1)), "fedfunds_raw_2024-05-01.csv");
        assert_eq!(
            snapshot_date_from_name("fedfunds_raw_2024-05-01.csv"),
            Some(date(2024, 5, 1))
        );
        assert_eq!(snapshot_date_from_name("fedfunds_2024-05-01.csv"), None);
        assert_eq!(snapshot_date_from_name("fedfunds_raw_latest.csv"), None);
    }

    #[test]
    fn snapshot_round_trips_raw_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw_snapshot(dir.path(), &inputs()).unwrap();
        assert_eq!(path.file_name().unwrap(), "fedfunds_raw_2008-12-16.csv");

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("date,DFF,DFEDTAR,DFEDTARL,DFEDTARU\n"));
        assert!(text.contains("2008-12-15,0.12,1.0,,\n"));

        let back = read_raw_snapshot(&path).unwrap();
        assert_eq!(back, inputs());
    }

    #[test]
    fn locate_prefers_latest_on_or_before_end_then_next_later() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "fedfunds_raw_2024-01-05.csv",
            "fedfunds_raw_2024-03-01.csv",
            "fedfunds_raw_2024-02-01.csv",
            "fedfunds_2024-06-01.csv",
        ] {
            std::fs::write(dir.path().join(name), "date,DFF,DFEDTAR,DFEDTARL,DFEDTARU\n").unwrap();
        }
        let local = LocalSnapshot::new(dir.path());

        let pick = |end| local.locate(end).unwrap().file_name().unwrap().to_owned();
        assert_eq!(pick(Some(date(2024, 2, 1))), "fedfunds_raw_2024-02-01.csv");
        assert_eq!(pick(Some(date(2024, 1, 20))), "fedfunds_raw_2024-01-05.csv");
        assert_eq!(pick(Some(date(2024, 4, 1))), "fedfunds_raw_2024-03-01.csv");
        assert_eq!(pick(Some(date(2023, 12, 1))), "fedfunds_raw_2024-01-05.csv");
        assert_eq!(pick(None), "fedfunds_raw_2024-03-01.csv");
    }

    #[test]
    fn locate_without_snapshots_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fedfunds_2024-06-01.csv"), "").unwrap();
        let local = LocalSnapshot::new(dir.path());

        for end in [Some(date(2024, 6, 1)), None] {
            let err = local.locate(end).unwrap_err();
            assert!(matches!(err, FetchError::SnapshotNotFound { .. }));
        }
    }

    #[test]
    fn local_source_reads_latest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        write_raw_snapshot(dir.path(), &inputs()).unwrap();

        let fetched = LocalSnapshot::new(dir.path()).fetch(None).unwrap();
        assert_eq!(fetched.snapshot_date, Some(date(2008, 12, 16)));
        assert_eq!(fetched.inputs.effective.len(), 2);
    }

    #[test]
    fn malformed_snapshot_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fedfunds_raw_2024-01-01.csv");
        std::fs::write(&path, "date,DFF,DFEDTAR,DFEDTARL,DFEDTARU\n2024-01-01,abc,,,\n").unwrap();
        let err = read_raw_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }
}
