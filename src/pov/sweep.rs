//! P-value curves over growing sub-samples.
//!
//! A channel with LSB replacement over its full area reports high p-values
//! from the smallest fractions onward. A clean or partially embedded channel
//! only rises, if at all, as the fraction approaches the full image.

use super::chi_square::{PovError, PovResult, PovTest};
use super::histogram::PairHistogram;
use crate::image::{Channel, ChannelKind, RgbImage};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use serde::{Deserialize, Serialize};

/// How channel values are fed to the test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMode {
    /// Raw 8-bit values, 128 value pairs.
    #[default]
    Values,
    /// Least significant bits only, a single `(0, 1)` pair.
    LsbPlane,
}

impl SampleMode {
    #[inline]
    fn map(self, value: u8) -> u8 {
        match self {
            SampleMode::Values => value,
            SampleMode::LsbPlane => value & 1,
        }
    }
}

/// Which sub-samples make up the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStrategy {
    /// `steps` random draws without replacement, sized `k/steps` of the channel.
    RandomSubsample {
        /// Number of fractions.
        steps: usize,
        /// Seed for the draws.
        seed: u64,
    },
    /// The first `k/steps` of the rows, top of the image first.
    RowPrefix {
        /// Number of fractions.
        steps: usize,
    },
}

impl SweepStrategy {
    fn steps(&self) -> usize {
        match *self {
            SweepStrategy::RandomSubsample { steps, .. } | SweepStrategy::RowPrefix { steps } => {
                steps
            }
        }
    }
}

impl Default for SweepStrategy {
    fn default() -> Self {
        SweepStrategy::RandomSubsample { steps: 10, seed: 0 }
    }
}

/// One point of a p-value curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Fraction of the channel sampled, in (0, 1].
    pub fraction: f64,
    /// Test outcome at that fraction.
    pub result: PovResult,
}

/// P-value curve for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepCurve {
    /// Channel the curve belongs to.
    pub channel: ChannelKind,
    /// Fractions whose test was inconclusive; they have no point.
    pub skipped: usize,
    /// Conclusive points, smallest fraction first.
    pub points: Vec<SweepPoint>,
}

impl SweepCurve {
    /// `(fraction, p_value)` pairs, ready for plotting.
    pub fn p_values(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.fraction, p.result.p_value))
            .collect()
    }

    /// True if every reported point lies above the significance level.
    ///
    /// An empty curve is never uniformly high.
    pub fn is_uniformly_high(&self, significance: f64) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.result.p_value > significance)
    }

    /// Smallest fraction whose p-value exceeds the significance level.
    pub fn first_fraction_above(&self, significance: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.result.p_value > significance)
            .map(|p| p.fraction)
    }
}

/// Runs a [`PovTest`] over growing sub-samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sweep {
    test: PovTest,
    mode: SampleMode,
    strategy: SweepStrategy,
}

impl Sweep {
    /// Creates a sweep. A strategy with zero steps is rejected.
    pub fn new(test: PovTest, mode: SampleMode, strategy: SweepStrategy) -> Result<Self, PovError> {
        if strategy.steps() == 0 {
            return Err(PovError::InvalidSweepSteps);
        }
        Ok(Self {
            test,
            mode,
            strategy,
        })
    }

    /// Computes the curve for one channel.
    ///
    /// Inconclusive fractions are skipped and counted; any other error
    /// aborts the sweep.
    pub fn run_channel(&self, kind: ChannelKind, channel: &Channel) -> Result<SweepCurve, PovError> {
        let steps = self.strategy.steps();
        let mut rng = match self.strategy {
            SweepStrategy::RandomSubsample { seed, .. } => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(kind.index() as u64);
                Some(rng)
            }
            SweepStrategy::RowPrefix { .. } => None,
        };

        let mut points = Vec::with_capacity(steps);
        let mut skipped = 0;

        for k in 1..=steps {
            let fraction = k as f64 / steps as f64;
            let hist = match rng.as_mut() {
                Some(rng) => {
                    let amount = (channel.len() as f64 * fraction) as usize;
                    let samples = channel.samples();
                    let picked = rand::seq::index::sample(rng, samples.len(), amount);
                    PairHistogram::from_iter_samples(
                        picked.into_iter().map(|i| self.mode.map(samples[i])),
                    )
                }
                None => {
                    let rows = (channel.height() as f64 * fraction) as usize;
                    PairHistogram::from_iter_samples(
                        channel.row_prefix(rows).iter().map(|&v| self.mode.map(v)),
                    )
                }
            };

            match self.test.run_histogram(&hist) {
                Ok(result) => points.push(SweepPoint { fraction, result }),
                Err(e) if e.is_inconclusive() => {
                    tracing::trace!(channel = %kind, fraction, error = %e, "Skipping sweep step");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            channel = %kind,
            points = points.len(),
            skipped,
            "Chi-square sweep complete"
        );

        Ok(SweepCurve {
            channel: kind,
            skipped,
            points,
        })
    }

    /// Computes one curve per channel.
    pub fn run_image(&self, image: &RgbImage) -> Result<Vec<SweepCurve>, PovError> {
        image
            .channels()
            .map(|(kind, channel)| self.run_channel(kind, channel))
            .collect()
    }
}
