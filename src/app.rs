//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging
//! - runs the build pipeline
//! - prints summaries/plots

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BuildArgs, Command, PlotArgs};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `fedfunds` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    // We want `fedfunds` and `fedfunds --plot` to behave like `fedfunds build ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Build(args) => handle_build(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `info` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_build(args: BuildArgs) -> Result<(), AppError> {
    let config = config_from_args(&args);
    let run = pipeline::run_build(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.table, &run.artifacts())
    );

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run.table, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let table = crate::io::read_table_csv(&args.table)?;

    println!("{}", crate::report::format_run_summary(&table, &[]));
    println!(
        "{}",
        crate::plot::render_ascii_plot(&table, args.width, args.height)
    );
    Ok(())
}

pub fn config_from_args(args: &BuildArgs) -> RunConfig {
    RunConfig {
        beg: args.beg_date,
        end: args.end_date,
        source: args.source,
        out_dir: args.out_dir.clone(),
        floor: args.floor,
        html: !args.no_html,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}

/// Rewrite argv so `fedfunds` defaults to `fedfunds build`.
///
/// Rules:
/// - `fedfunds`                      -> `fedfunds build`
/// - `fedfunds --end-date X ...`     -> `fedfunds build --end-date X ...`
/// - `fedfunds --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("build".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "build" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "build flags".
    if arg1.starts_with('-') {
        argv.insert(1, "build".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateBound, Source};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_build() {
        assert_eq!(rewrite_args(argv(&["fedfunds"])), argv(&["fedfunds", "build"]));
        assert_eq!(
            rewrite_args(argv(&["fedfunds", "--source", "local"])),
            argv(&["fedfunds", "build", "--source", "local"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["fedfunds", "plot", "--table", "t.csv"])),
            argv(&["fedfunds", "plot", "--table", "t.csv"])
        );
        assert_eq!(rewrite_args(argv(&["fedfunds", "--help"])), argv(&["fedfunds", "--help"]));
    }

    #[test]
    fn config_maps_flags() {
        let cli = crate::cli::Cli::parse_from(rewrite_args(argv(&[
            "fedfunds",
            "--end-date",
            "2008-12-31",
            "--no-html",
            "--plot",
            "--out-dir",
            "out",
        ])));
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        let config = config_from_args(&args);

        assert_eq!(config.beg, DateBound::Earliest);
        assert_eq!(config.end.date(), chrono::NaiveDate::from_ymd_opt(2008, 12, 31));
        assert_eq!(config.source, Source::Download);
        assert!(!config.html);
        assert!(config.plot);
        assert_eq!(config.data_dir(), std::path::PathBuf::from("out/data"));
        assert_eq!(config.images_dir(), std::path::PathBuf::from("out/images"));
    }
}
