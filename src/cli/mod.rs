//! Command-line parsing for the federal funds rate builder.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! fetching, alignment and rendering.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{DateBound, Source};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "fedfunds",
    version,
    about = "Federal funds effective and target rate chart builder (FRED-based)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the series, align them and write the CSV table and HTML chart.
    Build(BuildArgs),
    /// Print the summary and a terminal plot of a previously written table.
    Plot(PlotArgs),
}

/// Options for `fedfunds build`.
#[derive(Debug, Parser, Clone)]
pub struct BuildArgs {
    /// First date of the window (`earliest` or YYYY-MM-DD).
    #[arg(long, value_name = "DATE", default_value = "earliest")]
    pub beg_date: DateBound,

    /// Last date of the window (`most-recent` or YYYY-MM-DD).
    #[arg(long, value_name = "DATE", default_value = "most-recent")]
    pub end_date: DateBound,

    /// Where the raw series come from.
    #[arg(long, value_enum, default_value_t = Source::Download)]
    pub source: Source,

    /// Output root; CSV files go under `data/`, the chart under `images/`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Never start an `earliest` window before this date.
    #[arg(long, value_name = "DATE")]
    pub floor: Option<NaiveDate>,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Skip the HTML chart.
    #[arg(long)]
    pub no_html: bool,
}

/// Options for plotting a saved table.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Table CSV written by `fedfunds build`.
    #[arg(long, value_name = "CSV")]
    pub table: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn build_defaults() {
        let Command::Build(args) = parse(&["fedfunds", "build"]).command else {
            panic!("expected build");
        };
        assert_eq!(args.beg_date, DateBound::Earliest);
        assert_eq!(args.end_date, DateBound::MostRecent);
        assert_eq!(args.source, Source::Download);
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert!(args.floor.is_none());
        assert!(!args.plot);
        assert!(!args.no_html);
    }

    #[test]
    fn build_accepts_dates_and_local_source() {
        let cli = parse(&[
            "fedfunds",
            "build",
            "--beg-date",
            "2008-12-01",
            "--end-date",
            "2008-12-31",
            "--source",
            "local",
            "--floor",
            "1990-01-01",
        ]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(
            args.beg_date,
            DateBound::On(NaiveDate::from_ymd_opt(2008, 12, 1).unwrap())
        );
        assert_eq!(args.source, Source::Local);
        assert_eq!(args.floor, NaiveDate::from_ymd_opt(1990, 1, 1));
    }

    #[test]
    fn bad_date_is_a_usage_error() {
        assert!(Cli::try_parse_from(["fedfunds", "build", "--end-date", "yesterday-ish"]).is_err());
    }
}
