//! Coverage module
//!
//! Provides:
//! - LCOV parsing (`SF`/`DA` records)
//! - Per-file and aggregate line coverage
//! - Threshold validation

mod lcov;
mod threshold;

pub use lcov::*;
pub use threshold::*;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::CoverageError;

/// Marker used to shorten source paths when none is configured
pub const DEFAULT_LIBRARY_ROOT: &str = "lib/";

/// Options for a coverage computation
#[derive(Debug, Clone, Default)]
pub struct CoverageOptions {
    /// Build the sorted per-file breakdown
    pub show_details: bool,
    /// Per-file pass/fail annotation threshold, in percent
    pub min_coverage: f64,
    /// Paths containing this marker are truncated to start at it
    pub library_root: Option<String>,
}

impl CoverageOptions {
    /// Shorten a source path for display. Totals are keyed by the result.
    pub fn normalize_path(&self, path: &str) -> String {
        match self.library_root.as_deref() {
            Some(marker) if !marker.is_empty() => match path.find(marker) {
                Some(idx) => path[idx..].to_string(),
                None => path.to_string(),
            },
            _ => path.to_string(),
        }
    }
}

/// Line coverage accumulated for one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStat {
    pub path: String,
    pub total_lines: u64,
    pub covered_lines: u64,
}

impl FileStat {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn ratio(&self) -> f64 {
        self.covered_lines as f64 / self.total_lines.max(1) as f64
    }

    pub fn percent(&self) -> f64 {
        self.ratio() * 100.0
    }
}

/// One row of the per-file breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct FileDetail {
    pub stat: FileStat,
    pub coverage: f64,
    pub passed: bool,
}

/// Result of a coverage computation
#[derive(Debug, Clone, Default)]
pub struct CoverageReport {
    pub total_coverage: f64,
    pub total_lines: u64,
    pub covered_lines: u64,
    /// Every source file seen, in first-seen order
    pub files: Vec<FileStat>,
    /// Files with at least one line, lowest coverage first.
    /// Empty unless details were requested.
    pub details: Vec<FileDetail>,
}

impl CoverageReport {
    pub fn is_empty(&self) -> bool {
        self.total_lines == 0
    }

    pub fn file(&self, path: &str) -> Option<&FileStat> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Compute line coverage for an LCOV file
pub fn compute_coverage(
    lcov_path: &Path,
    options: &CoverageOptions,
) -> Result<CoverageReport, CoverageError> {
    let file = File::open(lcov_path).map_err(|e| CoverageError::read(lcov_path, e))?;
    parse_lcov_reader(BufReader::new(file), options)
        .map_err(|e| CoverageError::read(lcov_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_compute_coverage_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lcov.info");
        fs::write(&path, "TN:\nSF:/repo/lib/a.dart\nDA:1,4\nDA:2,0\nend_of_record\n").unwrap();

        let options = CoverageOptions {
            library_root: Some(DEFAULT_LIBRARY_ROOT.to_string()),
            ..Default::default()
        };
        let report = compute_coverage(&path, &options).unwrap();

        assert_eq!(report.total_lines, 2);
        assert_eq!(report.covered_lines, 1);
        assert!((report.total_coverage - 50.0).abs() < 0.01);
        assert!(report.file("lib/a.dart").is_some());
    }

    #[test]
    fn test_compute_coverage_missing_file() {
        let dir = tempdir().unwrap();
        let err = compute_coverage(&dir.path().join("nope.info"), &CoverageOptions::default())
            .unwrap_err();
        assert!(matches!(err, CoverageError::NotFound { .. }));
    }

    #[test]
    fn test_compute_coverage_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lcov.info");
        fs::write(&path, b"SF:a.js\nDA:1,1\n\xff\xfe\n").unwrap();

        let err = compute_coverage(&path, &CoverageOptions::default()).unwrap_err();
        assert!(matches!(err, CoverageError::Read { .. }));
    }

    #[test]
    fn test_normalize_path() {
        let options = CoverageOptions {
            library_root: Some("lib/".to_string()),
            ..Default::default()
        };
        assert_eq!(options.normalize_path("/home/ci/app/lib/src/a.dart"), "lib/src/a.dart");
        assert_eq!(options.normalize_path("test/a_test.dart"), "test/a_test.dart");
        assert_eq!(
            CoverageOptions::default().normalize_path("/home/ci/app/lib/a.dart"),
            "/home/ci/app/lib/a.dart"
        );
    }

    #[test]
    fn test_file_stat_ratio_with_no_lines() {
        let stat = FileStat::new("empty.js");
        assert_eq!(stat.ratio(), 0.0);
    }
}
