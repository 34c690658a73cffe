//! LSB Steganalysis Library
//!
//! Statistical detection of least-significant-bit replacement in images,
//! and a demonstration of how an adaptive adversary evades one of the
//! detectors.
//!
//! # Architecture
//!
//! ```text
//! image source → channels ─┬→ pair histogram → chi-square PoV test → p-value curves
//!                          └→ blocks → noise → RS classifier → RS detector
//!                                                                   ↓
//!                                                  oracle attack (clears LSBs, re-probes)
//! ```
//!
//! # Design Principles
//!
//! - **Pure results**: every test returns numbers and verdicts; rendering
//!   and prompting belong to the caller
//! - **No fake p-values**: inconclusive tests are reported as such, never
//!   replaced by a neutral value
//! - **Reproducible randomness**: masks and sub-samples come from explicit seeds
//! - **Copy-on-write images**: transformations return new images
//!
//! # Example
//!
//! ```no_run
//! use lsb_steganalysis::{
//!     attack::OracleAttack,
//!     image::{ImageSource, SyntheticConfig, SyntheticSource},
//!     pov::{PovTest, SampleMode, Sweep, SweepStrategy},
//!     rs::{Mask, RsAnalyzer, RsDetector},
//! };
//!
//! let mut source = SyntheticSource::new(SyntheticConfig {
//!     embed_rate: 1.0,
//!     ..Default::default()
//! })
//! .unwrap();
//! let image = source.next_image().unwrap();
//!
//! // Chi-square p-value curves, one per channel
//! let sweep = Sweep::new(
//!     PovTest::default(),
//!     SampleMode::Values,
//!     SweepStrategy::RandomSubsample { steps: 10, seed: 7 },
//! )
//! .unwrap();
//! let curves = sweep.run_image(&image).unwrap();
//!
//! // RS verdict
//! let mask = Mask::seeded(8, 8, Some(42)).unwrap();
//! let detector = RsDetector::new(RsAnalyzer::new(mask), 0.1).unwrap();
//! let detection = detector.inspect(&image).unwrap();
//!
//! // Evade the RS detector if it fired
//! if detection.stego {
//!     let report = OracleAttack::new(&detector, 50).run(&image).unwrap();
//!     println!("{} after {} modifications", report.outcome, report.modifications);
//! }
//! # let _ = curves;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod attack;
pub mod config;
pub mod image;
pub mod metrics;
pub mod pov;
pub mod report;
pub mod rs;

// Re-export commonly used types at crate root
pub use attack::{AttackOutcome, AttackReport, OracleAttack};
pub use config::AnalysisConfig;
pub use image::{Channel, ChannelKind, RgbImage};
pub use pov::{PovError, PovResult, PovTest, Sweep, SweepCurve};
pub use rs::{Detection, Mask, RsAnalyzer, RsDetector, RsSignature};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
