//! covcalc - LCOV coverage calculator for CI pipelines
//!
//! Exit codes:
//!   0 - Success (coverage at or above --fail-under, or no gate set)
//!   1 - Coverage below --fail-under, missing LCOV file, or bad configuration

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use covcalc::config::{validate_percentage, Config};
use covcalc::report::{render_csv, render_json, render_text, render_value};
use covcalc::{compute_coverage, validate_threshold, CoverageOptions, CoverageReport, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "covcalc")]
#[command(about = "Compute code coverage from an LCOV file")]
#[command(version)]
struct Cli {
    /// Path to the lcov.info file (default: coverage/lcov.info)
    lcov_file: Option<PathBuf>,

    /// Show coverage per file, lowest first
    #[arg(short, long)]
    details: bool,

    /// Minimum coverage used to mark files and the total as passing (default: 0.0)
    #[arg(short, long, value_name = "PERCENT")]
    min_coverage: Option<f64>,

    /// Exit with status 1 when total coverage is below this value
    #[arg(long, value_name = "PERCENT")]
    fail_under: Option<f64>,

    /// Output format (default: text)
    #[arg(long, value_enum)]
    output_format: Option<OutputFormat>,

    /// Shorten source paths to start at this marker (default: lib/)
    #[arg(long, value_name = "MARKER", conflicts_with = "no_library_root")]
    library_root: Option<String>,

    /// Keep source paths exactly as written in the report
    #[arg(long)]
    no_library_root: bool,

    /// Path to config file (default: covcalc.toml, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print only the total coverage value
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// CLI flags merged over the config file
#[derive(Debug)]
struct Settings {
    lcov_path: PathBuf,
    options: CoverageOptions,
    fail_under: Option<f64>,
    output_format: OutputFormat,
    quiet: bool,
}

impl Settings {
    fn resolve(cli: Cli, config: Config) -> Result<Self> {
        let library_root = if cli.no_library_root {
            None
        } else {
            cli.library_root.or_else(|| config.library_root())
        };
        let section = config.coverage;

        let min_coverage = cli.min_coverage.unwrap_or(section.min_coverage);
        validate_percentage("--min-coverage", min_coverage)?;

        let fail_under = cli.fail_under.or(section.fail_under);
        if let Some(value) = fail_under {
            validate_percentage("--fail-under", value)?;
        }

        Ok(Self {
            lcov_path: cli.lcov_file.unwrap_or(section.lcov_path),
            options: CoverageOptions {
                show_details: cli.details || section.details,
                min_coverage,
                library_root,
            },
            fail_under,
            output_format: cli.output_format.unwrap_or(section.output_format),
            quiet: cli.quiet,
        })
    }

    /// Human-oriented messages go to stdout only in plain text mode
    fn say(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.output_format.is_machine() {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
    }
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::discover(cli.config.as_deref()).context("Could not load configuration")?;
    let settings = Settings::resolve(cli, config)?;
    debug!(?settings, "resolved settings");

    if !settings.lcov_path.exists() {
        eprintln!(
            "{} LCOV file not found: {}",
            "✗".red(),
            settings.lcov_path.display()
        );
        return Ok(1);
    }

    let report = match compute_coverage(&settings.lcov_path, &settings.options) {
        Ok(report) => report,
        Err(e) => {
            debug!(error = %e, "falling back to zero coverage");
            eprintln!("{} {}", "✗".red(), e);
            CoverageReport::default()
        }
    };
    info!(
        covered = report.covered_lines,
        total = report.total_lines,
        files = report.files.len(),
        "coverage computed"
    );

    // Breakdown and minimum status still reach the user on stderr
    if settings.output_format.is_machine()
        && (settings.options.show_details || settings.options.min_coverage > 0.0)
    {
        settings.say(&render_text(&report, settings.options.min_coverage));
    }

    match settings.output_format {
        OutputFormat::Text if settings.quiet => println!("{}", render_value(report.total_coverage)),
        OutputFormat::Text => println!("{}", render_text(&report, settings.options.min_coverage)),
        OutputFormat::Json => println!(
            "{}",
            render_json(&settings.lcov_path, report.total_coverage)
                .context("Failed to serialize JSON output")?
        ),
        OutputFormat::Csv => println!("{}", render_csv(&settings.lcov_path, report.total_coverage)),
    }

    let gate = validate_threshold(report.total_coverage, settings.fail_under);
    if let Some(message) = gate.gate_message() {
        settings.say(&format!("\n{}", message));
    }

    Ok(if gate.passed { 0 } else { 1 })
}
