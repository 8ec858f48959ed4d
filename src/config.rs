use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::coverage::DEFAULT_LIBRARY_ROOT;
use crate::report::OutputFormat;

pub const CONFIG_FILE: &str = "covcalc.toml";
pub const DEFAULT_LCOV_PATH: &str = "coverage/lcov.info";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub coverage: CoverageSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageSection {
    #[serde(default = "default_lcov_path")]
    pub lcov_path: PathBuf,
    /// Marker used to shorten source paths; empty disables it
    #[serde(default = "default_library_root")]
    pub library_root: String,
    #[serde(default)]
    pub min_coverage: f64,
    #[serde(default)]
    pub fail_under: Option<f64>,
    #[serde(default)]
    pub details: bool,
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl Default for CoverageSection {
    fn default() -> Self {
        Self {
            lcov_path: default_lcov_path(),
            library_root: default_library_root(),
            min_coverage: 0.0,
            fail_under: None,
            details: false,
            output_format: OutputFormat::default(),
        }
    }
}

fn default_lcov_path() -> PathBuf {
    PathBuf::from(DEFAULT_LCOV_PATH)
}

fn default_library_root() -> String {
    DEFAULT_LIBRARY_ROOT.to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load an explicit config file, or `covcalc.toml` when it exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.is_file() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_percentage("min_coverage", self.coverage.min_coverage)?;
        if let Some(fail_under) = self.coverage.fail_under {
            validate_percentage("fail_under", fail_under)?;
        }
        Ok(())
    }

    pub fn library_root(&self) -> Option<String> {
        let root = self.coverage.library_root.trim();
        (!root.is_empty()).then(|| root.to_string())
    }
}

pub fn validate_percentage(name: &str, value: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&value) {
        anyhow::bail!("{} must be between 0 and 100, got {}", name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[coverage]
lcov_path = "build/lcov.info"
library_root = "src/"
min_coverage = 80.0
fail_under = 70.5
details = true
output_format = "json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.coverage.lcov_path, PathBuf::from("build/lcov.info"));
        assert_eq!(config.library_root().as_deref(), Some("src/"));
        assert_eq!(config.coverage.min_coverage, 80.0);
        assert_eq!(config.coverage.fail_under, Some(70.5));
        assert!(config.coverage.details);
        assert_eq!(config.coverage.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.coverage.lcov_path, PathBuf::from(DEFAULT_LCOV_PATH));
        assert_eq!(config.library_root().as_deref(), Some("lib/"));
        assert_eq!(config.coverage.fail_under, None);
        assert_eq!(config.coverage.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_empty_library_root_disables_normalization() {
        let config: Config = toml::from_str("[coverage]\nlibrary_root = \"\"\n").unwrap();
        assert_eq!(config.library_root(), None);
    }

    #[test]
    fn test_load_rejects_out_of_range_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[coverage]\nfail_under = 150.0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("fail_under"));
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[coverage]\nbranch_coverage = true\n").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_discover_missing_explicit_file_fails() {
        let dir = tempdir().unwrap();
        assert!(Config::discover(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
