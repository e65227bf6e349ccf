//! Raw data sources (FRED download or a saved raw snapshot).

use chrono::NaiveDate;

use crate::domain::RateInputs;
use crate::error::FetchError;

pub mod fred;
pub mod snapshot;

pub use fred::{FredClient, FredEndpoint};
pub use snapshot::{LocalSnapshot, read_raw_snapshot, snapshot_file_name, write_raw_snapshot};

/// Raw series plus the last date present in any of them.
#[derive(Debug, Clone)]
pub struct RawFetch {
    pub inputs: RateInputs,
    pub snapshot_date: Option<NaiveDate>,
}

impl RawFetch {
    pub fn new(inputs: RateInputs) -> Self {
        let snapshot_date = inputs.last_date();
        Self { inputs, snapshot_date }
    }
}

/// Something that can supply the raw federal funds series.
///
/// `end` restricts the data to observations on or before that date when the
/// source supports it; sources are free to return more.
pub trait RateSource {
    fn fetch(&self, end: Option<NaiveDate>) -> Result<RawFetch, FetchError>;
}
