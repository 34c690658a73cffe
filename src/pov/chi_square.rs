//! Pairs-of-values chi-square test.
//!
//! LSB replacement pushes the counts of `2k` and `2k+1` towards each other.
//! The test measures how far each pair is from that equalized state: a
//! small statistic (high p-value) is what a fully embedded channel looks
//! like, a large statistic (low p-value) is what a natural histogram
//! looks like.

use super::histogram::PairHistogram;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use thiserror::Error;

/// Default minimum expected frequency for a pair to be included.
pub const DEFAULT_MIN_EXPECTED_FREQ: f64 = 4.0;

/// Default significance level for interpreting p-values.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Errors from the pairs-of-values test.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PovError {
    /// The sample holds no values.
    #[error("empty sample")]
    InvalidSample,

    /// No pair carries enough observations to test.
    #[error("test inconclusive: no pair has expected frequency above {min_expected_freq} ({sample_size} samples)")]
    DegenerateHistogram {
        /// Number of samples tested.
        sample_size: usize,
        /// Threshold in force.
        min_expected_freq: f64,
    },

    /// Minimum expected frequency is negative or not finite.
    #[error("invalid minimum expected frequency {0}")]
    InvalidThreshold(f64),

    /// A sweep was asked for zero steps.
    #[error("sweep needs at least one step")]
    InvalidSweepSteps,

    /// statrs rejected the degrees of freedom.
    #[error("chi-square distribution rejected parameters: {0}")]
    Distribution(String),
}

impl PovError {
    /// True for outcomes that mean "no answer for this sample" rather than
    /// a misuse of the API.
    pub fn is_inconclusive(&self) -> bool {
        matches!(
            self,
            PovError::InvalidSample | PovError::DegenerateHistogram { .. }
        )
    }
}

/// Outcome of one pairs-of-values test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PovResult {
    /// Accumulated chi-square statistic.
    pub statistic: f64,
    /// Pairs that passed the expected-frequency filter.
    pub included_pairs: usize,
    /// Samples counted.
    pub sample_size: usize,
    /// Degrees of freedom used for the p-value.
    pub degrees_of_freedom: usize,
    /// Upper-tail probability of the statistic.
    pub p_value: f64,
}

impl PovResult {
    /// True if the histogram is close enough to equalized pairs that
    /// LSB embedding cannot be ruled out at the given significance.
    pub fn suggests_embedding(&self, significance: f64) -> bool {
        self.p_value > significance
    }
}

/// Pairs-of-values chi-square test with a minimum expected frequency filter.
#[derive(Debug, Clone, Copy)]
pub struct PovTest {
    min_expected_freq: f64,
}

impl PovTest {
    /// Creates a test that skips pairs with `expected <= min_expected_freq`.
    pub fn new(min_expected_freq: f64) -> Result<Self, PovError> {
        if !min_expected_freq.is_finite() || min_expected_freq < 0.0 {
            return Err(PovError::InvalidThreshold(min_expected_freq));
        }
        Ok(Self { min_expected_freq })
    }

    /// Returns the minimum expected frequency.
    pub fn min_expected_freq(&self) -> f64 {
        self.min_expected_freq
    }

    /// Runs the test on raw samples.
    pub fn run(&self, samples: &[u8]) -> Result<PovResult, PovError> {
        self.run_histogram(&PairHistogram::from_samples(samples))
    }

    /// Runs the test on a prepared histogram.
    pub fn run_histogram(&self, hist: &PairHistogram) -> Result<PovResult, PovError> {
        let sample_size = hist.sample_size();
        if sample_size == 0 {
            return Err(PovError::InvalidSample);
        }

        let degenerate = PovError::DegenerateHistogram {
            sample_size,
            min_expected_freq: self.min_expected_freq,
        };

        // A single occupied value carries no pair information.
        if hist.distinct_values() < 2 {
            return Err(degenerate);
        }

        let mut statistic = 0.0;
        let mut included_pairs = 0usize;
        for bucket in hist.buckets() {
            if bucket.total() == 0 {
                continue;
            }
            let expected = bucket.expected();
            if expected <= self.min_expected_freq {
                continue;
            }
            let d0 = bucket.n0 as f64 - expected;
            let d1 = bucket.n1 as f64 - expected;
            statistic += (d0 * d0 + d1 * d1) / expected;
            included_pairs += 1;
        }

        if included_pairs == 0 {
            return Err(degenerate);
        }

        let degrees_of_freedom = included_pairs.saturating_sub(1).max(1);
        let dist = ChiSquared::new(degrees_of_freedom as f64)
            .map_err(|e| PovError::Distribution(e.to_string()))?;
        let p_value = dist.sf(statistic).clamp(0.0, 1.0);

        tracing::trace!(
            statistic,
            included_pairs,
            degrees_of_freedom,
            p_value,
            sample_size,
            "Pairs-of-values test"
        );

        Ok(PovResult {
            statistic,
            included_pairs,
            sample_size,
            degrees_of_freedom,
            p_value,
        })
    }
}

impl Default for PovTest {
    fn default() -> Self {
        Self {
            min_expected_freq: DEFAULT_MIN_EXPECTED_FREQ,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equalized_pairs_high_p_value() {
        // Every pair (2k, 2k+1) appears equally often.
        let data: Vec<u8> = (0..4096).map(|i| (i % 64) as u8).collect();
        let result = PovTest::default().run(&data).unwrap();

        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.included_pairs, 32);
        assert_eq!(result.degrees_of_freedom, 31);
        assert!(result.p_value > 0.99);
        assert!(result.suggests_embedding(DEFAULT_SIGNIFICANCE));
    }

    #[test]
    fn test_skewed_pairs_low_p_value() {
        // Only even values: every pair maximally unbalanced.
        let data: Vec<u8> = (0..4096).map(|i| ((i % 32) * 2) as u8).collect();
        let result = PovTest::default().run(&data).unwrap();

        assert!(result.statistic > 1000.0);
        assert!(result.p_value < 1e-6);
        assert!(!result.suggests_embedding(DEFAULT_SIGNIFICANCE));
    }

    #[test]
    fn test_empty_sample_invalid() {
        assert_eq!(PovTest::default().run(&[]), Err(PovError::InvalidSample));
    }

    #[test]
    fn test_constant_sample_degenerate() {
        let result = PovTest::default().run(&[200u8; 1000]);
        assert!(matches!(result, Err(PovError::DegenerateHistogram { .. })));
    }

    #[test]
    fn test_sparse_sample_degenerate() {
        // 8 samples spread over two pairs: expected 2 per value, below tau.
        let result = PovTest::default().run(&[0, 1, 0, 1, 10, 11, 10, 11]);
        let err = result.unwrap_err();

        assert!(matches!(err, PovError::DegenerateHistogram { sample_size: 8, .. }));
        assert!(err.is_inconclusive());
    }

    #[test]
    fn test_sparse_pairs_are_filtered() {
        let mut data = vec![0u8; 50];
        data.extend(vec![1u8; 50]);
        // Pair (100, 101) has expected 2 and must be skipped.
        data.extend([100, 100, 100, 101]);

        let result = PovTest::default().run(&data).unwrap();
        assert_eq!(result.included_pairs, 1);
        assert_eq!(result.degrees_of_freedom, 1);
        assert_eq!(result.sample_size, 104);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert_eq!(PovTest::new(-1.0).unwrap_err(), PovError::InvalidThreshold(-1.0));
        assert!(PovTest::new(f64::NAN).is_err());
    }
}
