//! Noise discrimination functions.
//!
//! A discriminator maps a block to a scalar that grows with local
//! roughness. RS analysis only compares values of the same discriminator,
//! so any monotone smoothness measure works.

use serde::{Deserialize, Serialize};

/// Smoothness measure over a row-major block.
pub trait Discriminator {
    /// Noise of a block `cols` samples wide.
    fn noise(&self, block: &[u8], cols: usize) -> u64;

    /// Short name for logs and reports.
    fn name(&self) -> &'static str;
}

/// Sum of absolute differences between horizontal neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowDifference;

impl Discriminator for RowDifference {
    fn noise(&self, block: &[u8], cols: usize) -> u64 {
        block
            .chunks(cols.max(1))
            .flat_map(|row| row.windows(2))
            .map(|w| w[0].abs_diff(w[1]) as u64)
            .sum()
    }

    fn name(&self) -> &'static str {
        "row"
    }
}

/// Row differences plus differences between vertical neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridDifference;

impl Discriminator for GridDifference {
    fn noise(&self, block: &[u8], cols: usize) -> u64 {
        let cols = cols.max(1);
        let vertical: u64 = block
            .iter()
            .zip(block.iter().skip(cols))
            .map(|(&a, &b)| a.abs_diff(b) as u64)
            .sum();
        RowDifference.noise(block, cols) + vertical
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

/// Configurable choice of discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    /// [`RowDifference`].
    #[default]
    Row,
    /// [`GridDifference`].
    Grid,
}

impl NoiseKind {
    /// Instantiates the discriminator.
    pub fn discriminator(self) -> Box<dyn Discriminator + Send + Sync> {
        match self {
            NoiseKind::Row => Box::new(RowDifference),
            NoiseKind::Grid => Box::new(GridDifference),
        }
    }
}
