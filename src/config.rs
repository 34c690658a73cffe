//! Analysis configuration.
//!
//! The statistical thresholds are empirical defaults, not invariants;
//! every one of them can be overridden from a TOML file.

use crate::attack::DEFAULT_BUDGET;
use crate::pov::{
    PovError, PovTest, SampleMode, SweepStrategy, DEFAULT_MIN_EXPECTED_FREQ, DEFAULT_SIGNIFICANCE,
};
use crate::rs::{
    Mask, MaskError, NoiseKind, RsAnalyzer, RsDetector, RsError, DEFAULT_MASK_COLS,
    DEFAULT_MASK_ROWS, DEFAULT_RS_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// `chi_square.min_expected_freq` is negative or not finite.
    #[error("invalid minimum expected frequency {0}")]
    InvalidMinExpectedFreq(f64),
    /// `chi_square.significance` is not strictly between 0 and 1.
    #[error("significance {0} outside (0, 1)")]
    InvalidSignificance(f64),
    /// `chi_square.sweep_steps` is zero.
    #[error("sweep needs at least one step")]
    InvalidSweepSteps,
    /// A mask dimension is zero.
    #[error("invalid mask shape {rows}x{cols}")]
    InvalidMaskShape {
        /// Configured rows.
        rows: usize,
        /// Configured columns.
        cols: usize,
    },
    /// `rs.threshold` is negative or not finite.
    #[error("invalid RS threshold {0}")]
    InvalidThreshold(f64),
    /// The explicit mask could not be parsed.
    #[error("mask error: {0}")]
    Mask(#[from] MaskError),
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this layout.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Chi-square pairs-of-values settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChiSquareConfig {
    /// Pairs with `expected <= min_expected_freq` are skipped.
    pub min_expected_freq: f64,
    /// Significance level for interpreting p-values.
    pub significance: f64,
    /// Number of sub-sample fractions in a sweep.
    pub sweep_steps: usize,
    /// Seed for random sub-sampling.
    pub sample_seed: u64,
    /// Raw values or LSB plane.
    pub mode: SampleMode,
    /// Sample by random draws (true) or by row prefixes (false).
    pub random_subsample: bool,
}

impl Default for ChiSquareConfig {
    fn default() -> Self {
        Self {
            min_expected_freq: DEFAULT_MIN_EXPECTED_FREQ,
            significance: DEFAULT_SIGNIFICANCE,
            sweep_steps: 10,
            sample_seed: 0,
            mode: SampleMode::Values,
            random_subsample: true,
        }
    }
}

impl ChiSquareConfig {
    /// Builds the test described by this section.
    pub fn test(&self) -> Result<PovTest, PovError> {
        PovTest::new(self.min_expected_freq)
    }

    /// Builds the sweep strategy described by this section.
    pub fn strategy(&self) -> SweepStrategy {
        if self.random_subsample {
            SweepStrategy::RandomSubsample {
                steps: self.sweep_steps,
                seed: self.sample_seed,
            }
        } else {
            SweepStrategy::RowPrefix {
                steps: self.sweep_steps,
            }
        }
    }
}

/// RS analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RsConfig {
    /// Mask height.
    pub mask_rows: usize,
    /// Mask width.
    pub mask_cols: usize,
    /// Seed for the random mask; OS entropy when absent.
    pub mask_seed: Option<u64>,
    /// Explicit mask rows such as `"10110100"`; overrides shape and seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<Vec<String>>,
    /// Divergence threshold.
    pub threshold: f64,
    /// Noise measure.
    pub noise: NoiseKind,
}

impl Default for RsConfig {
    fn default() -> Self {
        Self {
            mask_rows: DEFAULT_MASK_ROWS,
            mask_cols: DEFAULT_MASK_COLS,
            mask_seed: None,
            mask: None,
            threshold: DEFAULT_RS_THRESHOLD,
            noise: NoiseKind::Row,
        }
    }
}

impl RsConfig {
    /// Builds the session mask: the explicit rows if given, otherwise a
    /// random draw.
    pub fn mask(&self) -> Result<Mask, MaskError> {
        match &self.mask {
            Some(rows) => Mask::parse_rows(rows),
            None => Mask::seeded(self.mask_rows, self.mask_cols, self.mask_seed),
        }
    }

    /// Builds a detector around the given mask.
    pub fn detector(&self, mask: Mask) -> Result<RsDetector, RsError> {
        let analyzer = RsAnalyzer::with_discriminator(mask, self.noise.discriminator());
        RsDetector::new(analyzer, self.threshold)
    }
}

/// Oracle attack settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Maximum number of modifications.
    pub budget: usize,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    /// `[chi_square]` section.
    #[serde(default)]
    pub chi_square: ChiSquareConfig,
    /// `[rs]` section.
    #[serde(default)]
    pub rs: RsConfig,
    /// `[attack]` section.
    #[serde(default)]
    pub attack: AttackConfig,
}

impl AnalysisConfig {
    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cs = &self.chi_square;
        if !cs.min_expected_freq.is_finite() || cs.min_expected_freq < 0.0 {
            return Err(ConfigError::InvalidMinExpectedFreq(cs.min_expected_freq));
        }
        if !(cs.significance > 0.0 && cs.significance < 1.0) {
            return Err(ConfigError::InvalidSignificance(cs.significance));
        }
        if cs.sweep_steps == 0 {
            return Err(ConfigError::InvalidSweepSteps);
        }

        let rs = &self.rs;
        if rs.mask_rows == 0 || rs.mask_cols == 0 {
            return Err(ConfigError::InvalidMaskShape {
                rows: rs.mask_rows,
                cols: rs.mask_cols,
            });
        }
        if !rs.threshold.is_finite() || rs.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(rs.threshold));
        }
        if let Some(rows) = &rs.mask {
            Mask::parse_rows(rows)?;
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }
}
