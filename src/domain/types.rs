//! Shared domain types.
//!
//! These types are kept small and immutable once built so they can be:
//!
//! - handed from the fetcher to the aligner without copies of mutable state
//! - exported to CSV and to the chart payload
//! - reloaded later for plotting

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;

use crate::error::ConfigError;

/// FRED series id of the daily effective federal funds rate.
pub const SERIES_EFFECTIVE: &str = "DFF";
/// FRED series id of the point target (discontinued after 2008-12-15).
pub const SERIES_TARGET: &str = "DFEDTAR";
/// FRED series id of the target range lower bound (from 2008-12-16).
pub const SERIES_TARGET_LOWER: &str = "DFEDTARL";
/// FRED series id of the target range upper bound (from 2008-12-16).
pub const SERIES_TARGET_UPPER: &str = "DFEDTARU";

/// Name used for the combined point/range target in diagnostics.
pub const SERIES_TARGET_ANY: &str = "target";

/// A single observation, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Observations of one variable, strictly increasing by date.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    id: String,
    points: Vec<RawPoint>,
}

impl RawSeries {
    /// Build a series from observations in any order.
    ///
    /// When a date appears more than once the observation that comes last wins.
    pub fn from_observations(id: impl Into<String>, observations: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let mut points: Vec<RawPoint> = observations
            .into_iter()
            .map(|(date, value)| RawPoint { date, value })
            .collect();
        // Stable sort keeps arrival order among equal dates.
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<RawPoint> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => deduped.push(p),
            }
        }

        Self {
            id: id.into(),
            points: deduped,
        }
    }

    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            points: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn points(&self) -> &[RawPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Last observation at or before `date`.
    pub fn at_or_before(&self, date: NaiveDate) -> Option<&RawPoint> {
        let idx = self.points.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| &self.points[i])
    }

    /// Whether any observation falls inside `[beg, end]`.
    pub fn has_points_within(&self, beg: NaiveDate, end: NaiveDate) -> bool {
        self.points_within(beg, end).next().is_some()
    }

    pub fn points_within(&self, beg: NaiveDate, end: NaiveDate) -> impl Iterator<Item = &RawPoint> {
        let start = self.points.partition_point(|p| p.date < beg);
        self.points[start..].iter().take_while(move |p| p.date <= end)
    }
}

/// A target range observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePoint {
    pub date: NaiveDate,
    pub lower: f64,
    pub upper: f64,
}

/// Target range observations, strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeSeries {
    points: Vec<RangePoint>,
}

impl RangeSeries {
    /// Join lower and upper bound series on date.
    ///
    /// Dates where only one bound is reported are dropped.
    pub fn from_bounds(lower: &RawSeries, upper: &RawSeries) -> Self {
        let mut points = Vec::with_capacity(lower.len().min(upper.len()));
        let (mut i, mut j) = (0, 0);
        let (lo, hi) = (lower.points(), upper.points());
        while i < lo.len() && j < hi.len() {
            match lo[i].date.cmp(&hi[j].date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    points.push(RangePoint {
                        date: lo[i].date,
                        lower: lo[i].value,
                        upper: hi[j].value,
                    });
                    i += 1;
                    j += 1;
                }
            }
        }
        Self { points }
    }

    /// Build from `(date, lower, upper)` triples in any order; later duplicates win.
    pub fn from_points(points: impl IntoIterator<Item = (NaiveDate, f64, f64)>) -> Self {
        let mut points: Vec<RangePoint> = points
            .into_iter()
            .map(|(date, lower, upper)| RangePoint { date, lower, upper })
            .collect();
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<RangePoint> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => deduped.push(p),
            }
        }
        Self { points: deduped }
    }

    pub fn points(&self) -> &[RangePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn at_or_before(&self, date: NaiveDate) -> Option<&RangePoint> {
        let idx = self.points.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| &self.points[i])
    }

    pub fn has_points_within(&self, beg: NaiveDate, end: NaiveDate) -> bool {
        let start = self.points.partition_point(|p| p.date < beg);
        self.points.get(start).is_some_and(|p| p.date <= end)
    }

    pub fn dates_within(&self, beg: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> + '_ {
        let start = self.points.partition_point(|p| p.date < beg);
        self.points[start..]
            .iter()
            .take_while(move |p| p.date <= end)
            .map(|p| p.date)
    }
}

/// Raw inputs handed from a data source to the aligner.
#[derive(Debug, Clone, PartialEq)]
pub struct RateInputs {
    pub effective: RawSeries,
    pub target_point: RawSeries,
    pub target_range: RangeSeries,
}

impl RateInputs {
    /// Earliest date present in any input series.
    pub fn first_date(&self) -> Option<NaiveDate> {
        [
            self.effective.first_date(),
            self.target_point.first_date(),
            self.target_range.first_date(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Latest date present in any input series.
    pub fn last_date(&self) -> Option<NaiveDate> {
        [
            self.effective.last_date(),
            self.target_point.last_date(),
            self.target_range.last_date(),
        ]
        .into_iter()
        .flatten()
        .max()
    }
}

/// The policy target in force at a date.
///
/// The Fed announced a single point target until 2008-12-15 and a lower/upper
/// range afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Point(f64),
    Range { lower: f64, upper: f64 },
}

impl Target {
    /// The single-valued target: the point itself or the range midpoint.
    pub fn rate(&self) -> f64 {
        match *self {
            Target::Point(value) => value,
            Target::Range { lower, upper } => (lower + upper) / 2.0,
        }
    }

    pub fn lower(&self) -> Option<f64> {
        match *self {
            Target::Point(_) => None,
            Target::Range { lower, .. } => Some(lower),
        }
    }

    pub fn upper(&self) -> Option<f64> {
        match *self {
            Target::Point(_) => None,
            Target::Range { upper, .. } => Some(upper),
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Target::Range { .. })
    }
}

/// One row of the aligned table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub effective_rate: Option<f64>,
    pub target: Option<Target>,
    pub in_recession: bool,
}

impl AlignedRow {
    pub fn target_rate(&self) -> Option<f64> {
        self.target.map(|t| t.rate())
    }

    pub fn target_lower(&self) -> Option<f64> {
        self.target.and_then(|t| t.lower())
    }

    pub fn target_upper(&self) -> Option<f64> {
        self.target.and_then(|t| t.upper())
    }
}

/// A concrete, resolved date window (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    pub beg: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.beg <= date && date <= self.end
    }
}

/// Aligned rows in ascending date order with unique dates.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    window: Window,
    rows: Vec<AlignedRow>,
}

impl AlignedTable {
    /// Wrap rows that are already strictly increasing by date.
    ///
    /// Returns `None` if the ordering invariant does not hold or a row is
    /// outside the window.
    pub fn new(window: Window, rows: Vec<AlignedRow>) -> Option<Self> {
        let ordered = rows.windows(2).all(|w| w[0].date < w[1].date);
        let inside = rows.iter().all(|r| window.contains(r.date));
        if ordered && inside {
            Some(Self { window, rows })
        } else {
            None
        }
    }

    /// Wrap rows the caller built in ascending date order inside `window`.
    pub(crate) fn from_sorted_rows(window: Window, rows: Vec<AlignedRow>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
        debug_assert!(rows.iter().all(|r| window.contains(r.date)));
        Self { window, rows }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&AlignedRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&AlignedRow> {
        self.rows.last()
    }
}

/// A window bound as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Earliest,
    MostRecent,
    On(NaiveDate),
}

impl DateBound {
    pub fn date(&self) -> Option<NaiveDate> {
        match *self {
            DateBound::On(d) => Some(d),
            DateBound::Earliest | DateBound::MostRecent => None,
        }
    }
}

impl FromStr for DateBound {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "earliest" => Ok(DateBound::Earliest),
            "most-recent" | "latest" | "today" => Ok(DateBound::MostRecent),
            _ => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(DateBound::On)
                .map_err(|_| ConfigError::DateBound(s.to_string())),
        }
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateBound::Earliest => write!(f, "earliest"),
            DateBound::MostRecent => write!(f, "most-recent"),
            DateBound::On(d) => write!(f, "{d}"),
        }
    }
}

/// Where raw series come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Download from FRED and save a raw snapshot.
    Download,
    /// Read a previously saved raw snapshot.
    Local,
}

/// Resolved configuration for a `fedfunds build` run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub beg: DateBound,
    pub end: DateBound,
    pub source: Source,
    pub out_dir: PathBuf,
    pub floor: Option<NaiveDate>,
    pub html: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl RunConfig {
    /// Directory for CSV files (raw snapshots and aligned tables).
    pub fn data_dir(&self) -> PathBuf {
        self.out_dir.join("data")
    }

    /// Directory for chart artifacts.
    pub fn images_dir(&self) -> PathBuf {
        self.out_dir.join("images")
    }
}
