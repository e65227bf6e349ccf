//! Export the aligned table to CSV, and read it back.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per date, missing values as empty cells.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{AlignedRow, AlignedTable, Target, Window};
use crate::error::{AppError, EXIT_CONFIG, WriteError};
use crate::io::atomic::write_atomic;

/// `fedfunds_<end>.csv`
pub fn table_file_name(end: NaiveDate) -> String {
    format!("fedfunds_{end}.csv")
}

/// `fedfunds_<end>.html`
pub fn chart_file_name(end: NaiveDate) -> String {
    format!("fedfunds_{end}.html")
}

/// Allowed gap between `target_rate` and the midpoint of the bounds.
const MIDPOINT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Serialize, Deserialize)]
struct TableRecord {
    date: NaiveDate,
    effective_rate: Option<f64>,
    target_rate: Option<f64>,
    target_lower: Option<f64>,
    target_upper: Option<f64>,
    in_recession: bool,
}

impl From<&AlignedRow> for TableRecord {
    fn from(row: &AlignedRow) -> Self {
        Self {
            date: row.date,
            effective_rate: row.effective_rate,
            target_rate: row.target_rate(),
            target_lower: row.target_lower(),
            target_upper: row.target_upper(),
            in_recession: row.in_recession,
        }
    }
}

impl TableRecord {
    fn into_row(self) -> Result<AlignedRow, String> {
        let target = match (self.target_rate, self.target_lower, self.target_upper) {
            (rate, Some(lower), Some(upper)) => {
                let range = Target::Range { lower, upper };
                if let Some(rate) = rate {
                    if (rate - range.rate()).abs() > MIDPOINT_TOLERANCE {
                        return Err(format!(
                            "{}: target_rate {rate} is not the midpoint of [{lower}, {upper}]",
                            self.date
                        ));
                    }
                }
                Some(range)
            }
            (Some(rate), None, None) => Some(Target::Point(rate)),
            (None, None, None) => None,
            _ => return Err(format!("{}: only one target bound is present", self.date)),
        };
        Ok(AlignedRow {
            date: self.date,
            effective_rate: self.effective_rate,
            target,
            in_recession: self.in_recession,
        })
    }
}

/// Encode the table as CSV bytes.
pub fn table_csv_bytes(table: &AlignedTable) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in table.rows() {
        writer.serialize(TableRecord::from(row))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Write the aligned table to `path`.
pub fn write_table_csv(path: &Path, table: &AlignedTable) -> Result<PathBuf, WriteError> {
    let bytes = table_csv_bytes(table).map_err(|e| WriteError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), rows = table.len(), "wrote aligned table");
    Ok(path.to_path_buf())
}

/// Read an aligned table CSV produced by `write_table_csv`.
///
/// The window of the returned table spans the first to the last row.
pub fn read_table_csv(path: &Path) -> Result<AlignedTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_CONFIG, format!("Failed to open table CSV '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<TableRecord>().enumerate() {
        let record = record.map_err(|e| {
            AppError::new(EXIT_CONFIG, format!("Invalid table CSV row {}: {e}", idx + 1))
        })?;
        let row = record
            .into_row()
            .map_err(|e| AppError::new(EXIT_CONFIG, format!("Invalid table CSV row {}: {e}", idx + 1)))?;
        rows.push(row);
    }

    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Err(AppError::new(
            EXIT_CONFIG,
            format!("Table CSV '{}' has no rows.", path.display()),
        ));
    };
    let window = Window {
        beg: first.date,
        end: last.date,
    };

    AlignedTable::new(window, rows).ok_or_else(|| {
        AppError::new(
            EXIT_CONFIG,
            format!("Table CSV '{}' is not strictly ordered by date.", path.display()),
        )
    })
}
