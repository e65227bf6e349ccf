//! Resolve `earliest` / `most-recent` bounds into a concrete window.
//!
//! This runs at the configuration boundary so the aligner only ever sees
//! concrete dates.

use chrono::NaiveDate;

use crate::domain::{DateBound, RateInputs, Window};
use crate::error::AlignError;

/// Resolve CLI bounds against the data actually available.
///
/// - `MostRecent` becomes the latest date in any input series.
/// - `Earliest` becomes the earliest date in any input series, or `floor`
///   when the floor is later.
pub fn resolve_window(
    beg: DateBound,
    end: DateBound,
    inputs: &RateInputs,
    floor: Option<NaiveDate>,
) -> Result<Window, AlignError> {
    if let (DateBound::On(b), DateBound::On(e)) = (beg, end) {
        if b > e {
            return Err(AlignError::InvalidRange { beg: b, end: e });
        }
    }

    let (Some(first), Some(last)) = (inputs.first_date(), inputs.last_date()) else {
        return Err(AlignError::MissingData {
            end: end.date(),
            first_available: None,
        });
    };

    let resolved_end = match end {
        DateBound::On(d) => d,
        DateBound::MostRecent => last,
        DateBound::Earliest => first,
    };
    if resolved_end < first {
        return Err(AlignError::MissingData {
            end: Some(resolved_end),
            first_available: Some(first),
        });
    }

    let resolved_beg = match beg {
        DateBound::On(d) => d,
        DateBound::Earliest => floor.map_or(first, |f| f.max(first)),
        DateBound::MostRecent => last,
    };
    if resolved_beg > resolved_end {
        return Err(AlignError::InvalidRange {
            beg: resolved_beg,
            end: resolved_end,
        });
    }

    Ok(Window {
        beg: resolved_beg,
        end: resolved_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RangeSeries, RawSeries};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inputs() -> RateInputs {
        RateInputs {
            effective: RawSeries::from_observations(
                "DFF",
                vec![(date(1954, 7, 1), 1.13), (date(2008, 12, 17), 0.16)],
            ),
            target_point: RawSeries::from_observations("DFEDTAR", vec![(date(1982, 9, 27), 10.25)]),
            target_range: RangeSeries::from_points(vec![(date(2024, 5, 1), 5.25, 5.5)]),
        }
    }

    #[test]
    fn sentinels_resolve_to_data_extremes() {
        let w = resolve_window(DateBound::Earliest, DateBound::MostRecent, &inputs(), None).unwrap();
        assert_eq!(w.beg, date(1954, 7, 1));
        assert_eq!(w.end, date(2024, 5, 1));
    }

    #[test]
    fn floor_applies_only_when_later_than_data() {
        let w = resolve_window(
            DateBound::Earliest,
            DateBound::MostRecent,
            &inputs(),
            Some(date(1990, 1, 1)),
        )
        .unwrap();
        assert_eq!(w.beg, date(1990, 1, 1));

        let w = resolve_window(
            DateBound::Earliest,
            DateBound::MostRecent,
            &inputs(),
            Some(date(1900, 1, 1)),
        )
        .unwrap();
        assert_eq!(w.beg, date(1954, 7, 1));
    }

    #[test]
    fn explicit_begin_after_end_is_invalid_range() {
        let err = resolve_window(
            DateBound::On(date(2020, 1, 2)),
            DateBound::On(date(2020, 1, 1)),
            &inputs(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AlignError::InvalidRange {
                beg: date(2020, 1, 2),
                end: date(2020, 1, 1),
            }
        );
    }

    #[test]
    fn begin_after_latest_data_is_invalid_range() {
        let err = resolve_window(
            DateBound::On(date(2030, 1, 1)),
            DateBound::MostRecent,
            &inputs(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AlignError::InvalidRange { .. }));
    }

    #[test]
    fn end_before_all_data_is_missing_data() {
        let err = resolve_window(
            DateBound::Earliest,
            DateBound::On(date(1950, 1, 1)),
            &inputs(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AlignError::MissingData {
                end: Some(date(1950, 1, 1)),
                first_available: Some(date(1954, 7, 1)),
            }
        );
    }

    #[test]
    fn no_data_at_all_is_missing_data() {
        let empty = RateInputs {
            effective: RawSeries::empty("DFF"),
            target_point: RawSeries::empty("DFEDTAR"),
            target_range: RangeSeries::default(),
        };
        let err = resolve_window(DateBound::Earliest, DateBound::MostRecent, &empty, None).unwrap_err();
        assert_eq!(
            err,
            AlignError::MissingData {
                end: None,
                first_available: None,
            }
        );
    }
}
