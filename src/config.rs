//! Run configuration, filled from the command line.

use std::path::PathBuf;

use anyhow::{bail, Result};

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Metadata file (`.csv`, `.csv.zip`, `.csv.gz`, `.parquet`, `.json`).
    pub input: PathBuf,
    /// Optional local stopword list, one word per line.
    pub stopwords: PathBuf,
    /// Where the PNGs and the JSON summary are written.
    pub output_dir: PathBuf,
    /// Columns missing more than this fraction of values are dropped.
    pub missing_threshold: f64,
    pub top_journals: usize,
    pub head_rows: usize,
    pub dpi: u32,
    /// Explicit TrueType font for chart text.
    pub font: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("metadata.csv.zip"),
            stopwords: PathBuf::from("english_stopwords.txt"),
            output_dir: PathBuf::from("."),
            missing_threshold: 0.5,
            top_journals: 15,
            head_rows: 5,
            dpi: 150,
            font: None,
        }
    }
}

impl PipelineConfig {
    /// Reject settings that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.missing_threshold) {
            bail!(
                "missing threshold must be between 0 and 1, got {}",
                self.missing_threshold
            );
        }
        if self.top_journals == 0 {
            bail!("top journals must be at least 1");
        }
        if !(10..=1200).contains(&self.dpi) {
            bail!("dpi must be between 10 and 1200, got {}", self.dpi);
        }
        Ok(())
    }

    /// Word-cloud and font scale relative to a 100 dpi baseline.
    pub fn scale(&self) -> f64 {
        self.dpi as f64 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.input, PathBuf::from("metadata.csv.zip"));
        assert_eq!(config.missing_threshold, 0.5);
        assert_eq!(config.top_journals, 15);
    }

    #[test]
    fn test_out_of_range_values() {
        let bad_threshold = PipelineConfig {
            missing_threshold: 1.5,
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());

        let no_journals = PipelineConfig {
            top_journals: 0,
            ..Default::default()
        };
        assert!(no_journals.validate().is_err());

        let tiny_dpi = PipelineConfig {
            dpi: 1,
            ..Default::default()
        };
        assert!(tiny_dpi.validate().is_err());
    }
}
