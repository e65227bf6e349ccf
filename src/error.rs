//! Error types.
//!
//! Each layer has its own typed error (`AlignError`, `FetchError`, `WriteError`,
//! `ConfigError`). The binary boundary converts all of them into `AppError`,
//! which carries the process exit code.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Exit code for invalid configuration or usage.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for a data window the aligner cannot serve.
pub const EXIT_ALIGN: u8 = 3;
/// Exit code for fetch failures (network or local snapshot).
pub const EXIT_FETCH: u8 = 4;
/// Exit code for artifact write failures.
pub const EXIT_WRITE: u8 = 5;

/// Failures raised while resolving a window or aligning series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    #[error("invalid date range: begin {beg} is after end {end}")]
    InvalidRange { beg: NaiveDate, end: NaiveDate },

    #[error("series '{series}' has no observations in window [{beg}, {end}]")]
    EmptySeries {
        series: String,
        beg: NaiveDate,
        end: NaiveDate,
    },

    #[error("{}", missing_data_message(.end, .first_available))]
    MissingData {
        end: Option<NaiveDate>,
        first_available: Option<NaiveDate>,
    },
}

fn missing_data_message(end: &Option<NaiveDate>, first_available: &Option<NaiveDate>) -> String {
    match (end, first_available) {
        (Some(end), Some(first)) => {
            format!("requested end date {end} precedes the first available observation {first}")
        }
        (Some(end), None) => format!("no observations available up to requested end date {end}"),
        (None, _) => "no observations available in any input series".to_string(),
    }
}

/// Failures raised by a raw data source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("FRED request for {series} failed: {message}")]
    Request { series: String, message: String },

    #[error("FRED request for {series} failed with status {status}")]
    Status { series: String, status: u16 },

    #[error("failed to parse {series} data: {message}")]
    Parse { series: String, message: String },

    #[error("no raw snapshot {wanted} found in '{}'", dir.display())]
    SnapshotNotFound { dir: PathBuf, wanted: String },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid raw snapshot '{}': {message}", path.display())]
    Snapshot { path: PathBuf, message: String },
}

/// Failures raised while persisting artifacts.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode '{}': {message}", path.display())]
    Encode { path: PathBuf, message: String },
}

/// Invalid static configuration (recession table, date bounds).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid recession table: {0}")]
    RecessionTable(String),

    #[error("invalid date bound '{0}': expected an ISO date (YYYY-MM-DD), 'earliest' or 'most-recent'")]
    DateBound(String),
}

/// Error surfaced to `main`: a message plus the exit code to terminate with.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<AlignError> for AppError {
    fn from(err: AlignError) -> Self {
        AppError::new(EXIT_ALIGN, err.to_string())
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::new(EXIT_FETCH, err.to_string())
    }
}

impl From<WriteError> for AppError {
    fn from(err: WriteError) -> Self {
        AppError::new(EXIT_WRITE, err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(EXIT_CONFIG, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn align_errors_map_to_align_exit_code() {
        let err: AppError = AlignError::InvalidRange {
            beg: date(2020, 2, 1),
            end: date(2020, 1, 1),
        }
        .into();
        assert_eq!(err.exit_code(), EXIT_ALIGN);
        assert_eq!(
            err.to_string(),
            "invalid date range: begin 2020-02-01 is after end 2020-01-01"
        );
    }

    #[test]
    fn missing_data_message_names_first_available_date() {
        let err = AlignError::MissingData {
            end: Some(date(1950, 1, 1)),
            first_available: Some(date(1954, 7, 1)),
        };
        assert_eq!(
            err.to_string(),
            "requested end date 1950-01-01 precedes the first available observation 1954-07-01"
        );
    }
}
