//! Prometheus metrics for steganalysis runs.
//!
//! # Metrics Exposed
//!
//! ## RS Detector
//! - `lsb_steganalysis_detector_queries_total` - Detector invocations
//! - `lsb_steganalysis_stego_verdicts_total` - Stego-likely verdicts
//! - `lsb_steganalysis_rs_mass{channel, group}` - Latest RS group masses
//!
//! ## Chi-Square
//! - `lsb_steganalysis_pov_p_value{channel}` - Latest p-value
//! - `lsb_steganalysis_pov_inconclusive_total` - Tests with no usable pair
//!
//! ## Oracle Attack
//! - `lsb_steganalysis_attack_modifications_total` - LSB-clearing passes
//! - `lsb_steganalysis_attack_evasions_total` - Attacks ending clean
//!
//! Metrics are encoded in the Prometheus text format; serving them is left
//! to the caller.

mod collector;

pub use collector::{MetricsError, MetricsRegistry};
