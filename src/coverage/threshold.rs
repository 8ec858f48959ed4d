//! Coverage threshold validation

use colored::Colorize;

/// Result of threshold validation
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdResult {
    pub passed: bool,
    pub coverage: f64,
    pub threshold: Option<f64>,
    pub delta: Option<f64>,
}

impl ThresholdResult {
    /// Coverage still missing to reach the threshold, if any
    pub fn shortfall(&self) -> Option<f64> {
        self.delta.filter(|d| *d < 0.0).map(|d| -d)
    }

    /// Summary for the `--min-coverage` target
    pub fn minimum_message(&self) -> Option<String> {
        let threshold = self.threshold?;
        let message = if self.passed {
            format!(
                "{} Coverage meets the required minimum: {:.1}%",
                "✓".green(),
                threshold
            )
        } else {
            format!(
                "{} Coverage below the required minimum: {:.1}%\n   Needed: +{:.2}%",
                "✗".red(),
                threshold,
                self.shortfall().unwrap_or_default()
            )
        };
        Some(message)
    }

    /// Summary for the `--fail-under` gate
    pub fn gate_message(&self) -> Option<String> {
        let threshold = self.threshold?;
        let message = if self.passed {
            format!(
                "{} Coverage {:.2}% meets the limit {:.2}%",
                "✓".green(),
                self.coverage,
                threshold
            )
        } else {
            format!(
                "{} Coverage {:.2}% is below the limit {:.2}%",
                "✗".red(),
                self.coverage,
                threshold
            )
        };
        Some(message)
    }
}

/// Validate coverage against a threshold. No threshold always passes.
pub fn validate_threshold(coverage: f64, threshold: Option<f64>) -> ThresholdResult {
    ThresholdResult {
        passed: threshold.map(|t| coverage >= t).unwrap_or(true),
        coverage,
        threshold,
        delta: threshold.map(|t| coverage - t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_validation() {
        // Passing case
        let result = validate_threshold(40.0, Some(30.0));
        assert!(result.passed);
        assert_eq!(result.delta, Some(10.0));
        assert_eq!(result.shortfall(), None);

        // Failing case
        let result = validate_threshold(40.0, Some(50.0));
        assert!(!result.passed);
        assert_eq!(result.shortfall(), Some(10.0));
    }

    #[test]
    fn test_threshold_boundary_passes() {
        assert!(validate_threshold(75.0, Some(75.0)).passed);
    }

    #[test]
    fn test_no_threshold() {
        let result = validate_threshold(12.5, None);
        assert!(result.passed);
        assert_eq!(result.delta, None);
        assert!(result.gate_message().is_none());
        assert!(result.minimum_message().is_none());
    }

    #[test]
    fn test_messages() {
        colored::control::set_override(false);

        let failing = validate_threshold(40.0, Some(50.0));
        assert_eq!(
            failing.gate_message().unwrap(),
            "✗ Coverage 40.00% is below the limit 50.00%"
        );
        assert!(failing.minimum_message().unwrap().contains("Needed: +10.00%"));

        let passing = validate_threshold(40.0, Some(30.0));
        assert_eq!(
            passing.gate_message().unwrap(),
            "✓ Coverage 40.00% meets the limit 30.00%"
        );
    }
}
