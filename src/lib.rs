//! covcalc - LCOV line coverage calculator
//!
//! A library for reading LCOV coverage reports with:
//! - Per-file and aggregate line coverage from `SF`/`DA` records
//! - Lenient parsing: malformed records are skipped, not fatal
//! - Threshold checks for CI gates
//! - Text, JSON and CSV output

pub mod config;
pub mod coverage;
pub mod error;
pub mod report;

pub use config::Config;
pub use coverage::{
    compute_coverage, parse_lcov_reader, parse_lcov_string, validate_threshold, CoverageOptions,
    CoverageReport, FileDetail, FileStat, ThresholdResult,
};
pub use error::CoverageError;
pub use report::OutputFormat;
