//! Rendering of coverage results

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::coverage::{validate_threshold, CoverageReport};

const SEPARATOR_WIDTH: usize = 60;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Whether stdout is reserved for machine-readable output
    pub fn is_machine(&self) -> bool {
        !matches!(self, OutputFormat::Text)
    }
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    coverage: f64,
    file: &'a str,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Human-readable report, optionally with the per-file breakdown
pub fn render_text(report: &CoverageReport, min_coverage: f64) -> String {
    if report.is_empty() {
        return format!("{} No executable lines found to analyze", "⚠".yellow());
    }

    let mut lines = Vec::new();

    if !report.details.is_empty() {
        lines.push(format!("{}", "Coverage per file:".bold()));
        lines.push("-".repeat(SEPARATOR_WIDTH));
        for detail in &report.details {
            let status = if detail.passed { "✓".green() } else { "✗".red() };
            lines.push(format!(
                "{} {}: {:.1}% ({}/{})",
                status,
                detail.stat.path,
                detail.coverage,
                detail.stat.covered_lines,
                detail.stat.total_lines
            ));
        }
        lines.push("-".repeat(SEPARATOR_WIDTH));
    }

    let minimum = validate_threshold(report.total_coverage, Some(min_coverage));
    let status = if minimum.passed { "✓".green() } else { "✗".red() };
    lines.push(format!(
        "{} Total coverage: {:.2}% ({}/{})",
        status, report.total_coverage, report.covered_lines, report.total_lines
    ));

    if min_coverage > 0.0 {
        if let Some(message) = minimum.minimum_message() {
            lines.push(message);
        }
    }

    lines.join("\n")
}

pub fn render_json(lcov_path: &Path, coverage: f64) -> serde_json::Result<String> {
    let path = lcov_path.display().to_string();
    serde_json::to_string(&JsonSummary {
        coverage: round2(coverage),
        file: &path,
    })
}

pub fn render_csv(lcov_path: &Path, coverage: f64) -> String {
    format!("file,coverage\n{},{:.2}", lcov_path.display(), coverage)
}

/// Bare value for CI scripts
pub fn render_value(coverage: f64) -> String {
    format!("{:.1}", coverage)
}
