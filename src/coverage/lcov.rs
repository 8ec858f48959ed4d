//! LCOV format parser

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::num::IntErrorKind;

use tracing::debug;

use super::{CoverageOptions, CoverageReport, FileDetail, FileStat};

/// A classified LCOV line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record<'a> {
    /// `SF:<path>`
    SourceFile(&'a str),
    /// `DA:<line>,<count>[,<checksum>]`
    LineData { hits: i128 },
    /// A `DA:` line without a usable execution count
    Malformed(&'a str),
    /// Any other record type
    Other,
}

/// Classify a single line. Trailing whitespace is ignored.
pub fn parse_record(line: &str) -> Record<'_> {
    let line = line.trim_end();

    if let Some(path) = line.strip_prefix("SF:") {
        Record::SourceFile(path)
    } else if let Some(data) = line.strip_prefix("DA:") {
        let mut fields = data.split(',');
        let _line_number = fields.next();
        match fields.next().and_then(parse_hits) {
            Some(hits) => Record::LineData { hits },
            None => Record::Malformed(line),
        }
    } else {
        Record::Other
    }
}

/// Execution count of a `DA:` record. Integers too large to represent
/// saturate, only the sign matters for coverage.
fn parse_hits(field: &str) -> Option<i128> {
    match field.trim().parse::<i128>() {
        Ok(hits) => Some(hits),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i128::MAX),
            IntErrorKind::NegOverflow => Some(i128::MIN),
            _ => None,
        },
    }
}

/// Running totals while scanning an LCOV stream
#[derive(Debug, Default)]
struct Accumulator {
    current: Option<usize>,
    index: HashMap<String, usize>,
    files: Vec<FileStat>,
    total_lines: u64,
    covered_lines: u64,
}

impl Accumulator {
    fn feed(&mut self, line: &str, options: &CoverageOptions) {
        match parse_record(line) {
            Record::SourceFile(raw) => {
                if raw.is_empty() {
                    self.current = None;
                    return;
                }
                let path = options.normalize_path(raw);
                let idx = match self.index.get(&path) {
                    Some(&idx) => idx,
                    None => {
                        debug!(path = %path, "new source file");
                        self.files.push(FileStat::new(path.clone()));
                        self.index.insert(path, self.files.len() - 1);
                        self.files.len() - 1
                    }
                };
                self.current = Some(idx);
            }
            Record::LineData { hits } => {
                self.total_lines += 1;
                if hits > 0 {
                    self.covered_lines += 1;
                }

                match self.current.and_then(|idx| self.files.get_mut(idx)) {
                    Some(file) => {
                        file.total_lines += 1;
                        if hits > 0 {
                            file.covered_lines += 1;
                        }
                    }
                    None => debug!("DA record outside of a source file section"),
                }
            }
            Record::Malformed(raw) => debug!(record = raw, "skipping malformed DA record"),
            Record::Other => {}
        }
    }

    fn finish(self, options: &CoverageOptions) -> CoverageReport {
        if self.total_lines == 0 {
            return CoverageReport::default();
        }

        let total_coverage = (self.covered_lines as f64 / self.total_lines as f64) * 100.0;

        let details = if options.show_details {
            let mut details: Vec<FileDetail> = self
                .files
                .iter()
                .filter(|f| f.total_lines > 0)
                .map(|f| {
                    let coverage = f.percent();
                    FileDetail {
                        stat: f.clone(),
                        coverage,
                        passed: coverage >= options.min_coverage,
                    }
                })
                .collect();
            // Stable: equal ratios keep first-seen order
            details.sort_by(|a, b| a.stat.ratio().total_cmp(&b.stat.ratio()));
            details
        } else {
            Vec::new()
        };

        CoverageReport {
            total_coverage,
            total_lines: self.total_lines,
            covered_lines: self.covered_lines,
            files: self.files,
            details,
        }
    }
}

/// Parse LCOV content from any buffered reader
pub fn parse_lcov_reader<R: BufRead>(
    reader: R,
    options: &CoverageOptions,
) -> io::Result<CoverageReport> {
    let acc = reader
        .lines()
        .try_fold(Accumulator::default(), |mut acc, line| {
            acc.feed(&line?, options);
            Ok::<_, io::Error>(acc)
        })?;

    Ok(acc.finish(options))
}

/// Parse LCOV content from a string
pub fn parse_lcov_string(content: &str, options: &CoverageOptions) -> CoverageReport {
    let acc = content.lines().fold(Accumulator::default(), |mut acc, line| {
        acc.feed(line, options);
        acc
    });

    acc.finish(options)
}
