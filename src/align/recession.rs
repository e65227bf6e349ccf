//! Recession reference table and chart shading.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::Window;
use crate::error::ConfigError;

/// NBER business-cycle contractions, month-granular:
/// `(start_year, start_month, end_year, end_month)`.
const NBER_RECESSIONS: [(i32, u32, i32, u32); 15] = [
    (1929, 8, 1933, 3), // Great Depression
    (1937, 5, 1938, 6),
    (1945, 2, 1945, 10),
    (1948, 11, 1949, 10),
    (1953, 7, 1954, 5),
    (1957, 8, 1958, 4),
    (1960, 4, 1961, 2),
    (1969, 12, 1970, 11),
    (1973, 11, 1975, 3),
    (1980, 1, 1980, 7),
    (1981, 7, 1982, 11),
    (1990, 7, 1991, 3),
    (2001, 3, 2001, 11),
    (2007, 12, 2009, 6), // Great Recession
    (2020, 2, 2020, 4),  // COVID-19
];

/// A reference recession. `end == None` means the recession is ongoing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecessionInterval {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub label: String,
}

impl RecessionInterval {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        let label = match end {
            Some(end) => format!("{} - {}", start.format("%b %Y"), end.format("%b %Y")),
            None => format!("{} - present", start.format("%b %Y")),
        };
        Self { start, end, label }
    }

    /// Whole-month interval from the first day of the start month to the last
    /// day of the end month.
    pub fn months(start: (i32, u32), end: (i32, u32)) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(start.0, start.1, 1)?;
        let end = month_end(end.0, end.1)?;
        Some(Self::new(start, Some(end)))
    }

    /// Inclusive membership; an open interval runs through `open_end`.
    pub fn contains(&self, date: NaiveDate, open_end: NaiveDate) -> bool {
        let end = self.end.unwrap_or(open_end);
        self.start <= date && date <= end
    }
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// A recession band clipped to a chart window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadedRegion {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

/// Immutable, validated list of recession intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecessionTable {
    intervals: Vec<RecessionInterval>,
}

impl RecessionTable {
    /// Validate and wrap intervals.
    ///
    /// Intervals must be chronologically ordered and non-overlapping, and only
    /// the last one may be open.
    pub fn new(intervals: Vec<RecessionInterval>) -> Result<Self, ConfigError> {
        for (i, interval) in intervals.iter().enumerate() {
            if interval.end.is_some_and(|end| end < interval.start) {
                return Err(ConfigError::RecessionTable(format!(
                    "interval '{}' ends before it starts",
                    interval.label
                )));
            }
            if interval.end.is_none() && i + 1 != intervals.len() {
                return Err(ConfigError::RecessionTable(format!(
                    "open interval '{}' must be the last one",
                    interval.label
                )));
            }
            if let Some(prev) = i.checked_sub(1).map(|j| &intervals[j]) {
                // `prev.end` is always set here: only the last interval may be open.
                if prev.end.is_some_and(|prev_end| interval.start <= prev_end) {
                    return Err(ConfigError::RecessionTable(format!(
                        "interval '{}' overlaps or precedes '{}'",
                        interval.label, prev.label
                    )));
                }
            }
        }
        Ok(Self { intervals })
    }

    /// The NBER reference table, Aug 1929 through Apr 2020.
    pub fn nber() -> Self {
        let intervals = NBER_RECESSIONS
            .iter()
            .filter_map(|&(sy, sm, ey, em)| RecessionInterval::months((sy, sm), (ey, em)))
            .collect();
        Self { intervals }
    }

    /// A table with no recessions.
    pub fn empty() -> Self {
        Self { intervals: Vec::new() }
    }

    pub fn intervals(&self) -> &[RecessionInterval] {
        &self.intervals
    }

    /// Whether `date` falls inside any interval (inclusive); an open final
    /// interval runs through `open_end`.
    pub fn contains(&self, date: NaiveDate, open_end: NaiveDate) -> bool {
        let idx = self.intervals.partition_point(|r| r.start <= date);
        idx.checked_sub(1)
            .is_some_and(|i| self.intervals[i].contains(date, open_end))
    }

    /// Recession bands intersecting `window`, clipped to it.
    pub fn shaded_regions(&self, window: Window) -> Vec<ShadedRegion> {
        self.intervals
            .iter()
            .filter_map(|r| {
                let start = r.start.max(window.beg);
                let end = r.end.unwrap_or(window.end).min(window.end);
                (start <= end).then(|| ShadedRegion {
                    start,
                    end,
                    label: r.label.clone(),
                })
            })
            .collect()
    }
}

impl Default for RecessionTable {
    fn default() -> Self {
        Self::nber()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn nber_table_is_valid_and_complete() {
        let table = RecessionTable::nber();
        assert_eq!(table.intervals().len(), 15);
        assert!(RecessionTable::new(table.intervals().to_vec()).is_ok());
        assert_eq!(table.intervals()[13].label, "Dec 2007 - Jun 2009");
        assert_eq!(table.intervals()[14].end, Some(date(2020, 4, 30)));
    }

    #[test]
    fn membership_is_inclusive() {
        let table = RecessionTable::nber();
        let open_end = date(2025, 1, 1);
        assert!(table.contains(date(2020, 4, 15), open_end));
        assert!(table.contains(date(2020, 2, 1), open_end));
        assert!(table.contains(date(2020, 4, 30), open_end));
        assert!(!table.contains(date(2020, 5, 1), open_end));
        assert!(!table.contains(date(2019, 6, 1), open_end));
        assert!(table.contains(date(2008, 12, 16), open_end));
        assert!(!table.contains(date(1920, 1, 1), open_end));
    }

    #[test]
    fn open_interval_runs_through_open_end() {
        let table = RecessionTable::new(vec![
            RecessionInterval::months((2001, 3), (2001, 11)).unwrap(),
            RecessionInterval::new(date(2024, 3, 1), None),
        ])
        .unwrap();
        assert!(table.contains(date(2024, 6, 1), date(2024, 6, 30)));
        assert!(!table.contains(date(2024, 7, 1), date(2024, 6, 30)));
        assert_eq!(table.intervals()[1].label, "Mar 2024 - present");
    }

    #[test]
    fn rejects_overlap_and_misplaced_open_interval() {
        let overlapping = RecessionTable::new(vec![
            RecessionInterval::months((2001, 3), (2001, 11)).unwrap(),
            RecessionInterval::months((2001, 10), (2002, 2)).unwrap(),
        ]);
        assert!(matches!(overlapping, Err(ConfigError::RecessionTable(_))));

        let open_first = RecessionTable::new(vec![
            RecessionInterval::new(date(2001, 3, 1), None),
            RecessionInterval::months((2008, 1), (2009, 6)).unwrap(),
        ]);
        assert!(open_first.is_err());

        let inverted = RecessionTable::new(vec![RecessionInterval::new(
            date(2001, 3, 1),
            Some(date(2001, 1, 1)),
        )]);
        assert!(inverted.is_err());
    }

    #[test]
    fn shaded_regions_are_clipped_to_window() {
        let table = RecessionTable::nber();
        let window = Window {
            beg: date(2008, 1, 1),
            end: date(2020, 3, 15),
        };
        let regions = table.shaded_regions(window);
        assert_eq!(
            regions,
            vec![
                ShadedRegion {
                    start: date(2008, 1, 1),
                    end: date(2009, 6, 30),
                    label: "Dec 2007 - Jun 2009".to_string(),
                },
                ShadedRegion {
                    start: date(2020, 2, 1),
                    end: date(2020, 3, 15),
                    label: "Feb 2020 - Apr 2020".to_string(),
                },
            ]
        );
    }
}
