//! Adaptive evasion of the RS detector.
//!
//! Demonstrates that a single global threshold test can be driven to a
//! clean verdict by an adversary who only observes the verdict.

mod oracle;

pub use oracle::{AttackOutcome, AttackReport, OracleAttack, DEFAULT_BUDGET};
