//! Pairs-of-values chi-square steganalysis.
//!
//! Groups channel values into adjacent pairs `(2k, 2k+1)` and tests how
//! close each pair is to equal counts. Full LSB replacement equalizes the
//! pairs, so a high p-value is evidence of embedding.

mod chi_square;
mod histogram;
mod sweep;

pub use chi_square::{
    PovError, PovResult, PovTest, DEFAULT_MIN_EXPECTED_FREQ, DEFAULT_SIGNIFICANCE,
};
pub use histogram::{PairBucket, PairHistogram};
pub use sweep::{SampleMode, Sweep, SweepCurve, SweepPoint, SweepStrategy};
