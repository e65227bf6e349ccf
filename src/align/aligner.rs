//! Series alignment: raw effective/target series → one row per date.
//!
//! The aligner is a pure function of its inputs and the recession table it
//! was constructed with:
//!
//! 1. validate the window against the available data
//! 2. build the date axis (union of observation dates inside the window)
//! 3. forward-fill each variable onto the axis
//! 4. resolve the target regime (point vs range) per date
//! 5. tag recession membership

use chrono::NaiveDate;
use tracing::debug;

use crate::align::recession::RecessionTable;
use crate::domain::{AlignedRow, AlignedTable, RateInputs, SERIES_TARGET_ANY, Target, Window};
use crate::error::AlignError;

/// Aligns raw rate series against an injected recession table.
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    recessions: RecessionTable,
}

impl Aligner {
    pub fn new(recessions: RecessionTable) -> Self {
        Self { recessions }
    }

    pub fn recessions(&self) -> &RecessionTable {
        &self.recessions
    }

    /// Build the aligned table for a concrete window.
    pub fn align(&self, window: Window, inputs: &RateInputs) -> Result<AlignedTable, AlignError> {
        validate_window(window, inputs)?;

        let axis = date_axis(window, inputs);
        let rows: Vec<AlignedRow> = axis
            .into_iter()
            .map(|date| AlignedRow {
                date,
                effective_rate: inputs.effective.at_or_before(date).map(|p| p.value),
                target: target_at(inputs, date),
                in_recession: self.recessions.contains(date, window.end),
            })
            .collect();

        debug!(
            beg = %window.beg,
            end = %window.end,
            rows = rows.len(),
            "aligned rate series"
        );

        Ok(AlignedTable::from_sorted_rows(window, rows))
    }
}

fn validate_window(window: Window, inputs: &RateInputs) -> Result<(), AlignError> {
    if window.beg > window.end {
        return Err(AlignError::InvalidRange {
            beg: window.beg,
            end: window.end,
        });
    }

    match inputs.first_date() {
        None => {
            return Err(AlignError::MissingData {
                end: Some(window.end),
                first_available: None,
            });
        }
        Some(first) if window.end < first => {
            return Err(AlignError::MissingData {
                end: Some(window.end),
                first_available: Some(first),
            });
        }
        Some(_) => {}
    }

    if !inputs.effective.has_points_within(window.beg, window.end) {
        return Err(AlignError::EmptySeries {
            series: inputs.effective.id().to_string(),
            beg: window.beg,
            end: window.end,
        });
    }

    let has_target = inputs.target_point.has_points_within(window.beg, window.end)
        || inputs.target_range.has_points_within(window.beg, window.end);
    if !has_target {
        return Err(AlignError::EmptySeries {
            series: SERIES_TARGET_ANY.to_string(),
            beg: window.beg,
            end: window.end,
        });
    }

    Ok(())
}

/// Sorted union of every observation date inside the window.
fn date_axis(window: Window, inputs: &RateInputs) -> Vec<NaiveDate> {
    let mut axis: Vec<NaiveDate> = inputs
        .effective
        .points_within(window.beg, window.end)
        .map(|p| p.date)
        .chain(
            inputs
                .target_point
                .points_within(window.beg, window.end)
                .map(|p| p.date),
        )
        .chain(inputs.target_range.dates_within(window.beg, window.end))
        .collect();
    axis.sort_unstable();
    axis.dedup();
    axis
}

/// The target in force at `date`.
///
/// Whichever representation was observed most recently wins; a range observed
/// on the same day as a point target takes precedence.
fn target_at(inputs: &RateInputs, date: NaiveDate) -> Option<Target> {
    let point = inputs.target_point.at_or_before(date);
    let range = inputs.target_range.at_or_before(date);

    let as_range = |r: &crate::domain::RangePoint| Target::Range {
        lower: r.lower,
        upper: r.upper,
    };

    match (point, range) {
        (None, None) => None,
        (Some(p), None) => Some(Target::Point(p.value)),
        (None, Some(r)) => Some(as_range(r)),
        (Some(p), Some(r)) if p.date > r.date => Some(Target::Point(p.value)),
        (Some(_), Some(r)) => Some(as_range(r)),
    }
}
