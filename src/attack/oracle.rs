//! Oracle attack against the RS detector.
//!
//! The attacker only sees the detector's verdict. While the verdict is
//! "stego-likely" it clears every LSB of every channel and asks again,
//! stopping on a clean verdict, on a fixed point (nothing left to clear),
//! or when the modification budget runs out.

use crate::image::RgbImage;
use crate::rs::{Detection, RsDetector, RsError};
use serde::{Deserialize, Serialize};

/// Default number of modifications allowed.
pub const DEFAULT_BUDGET: usize = 50;

/// How an attack ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackOutcome {
    /// The detector reported the final image clean.
    Evaded,
    /// The budget ran out while the image was still detected.
    BudgetExhausted,
    /// The transformation stopped changing the image while it was still detected.
    Converged,
}

impl std::fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AttackOutcome::Evaded => "evaded detection",
            AttackOutcome::BudgetExhausted => "attack failed within budget",
            AttackOutcome::Converged => "attack failed at fixed point",
        })
    }
}

/// Result of an oracle attack.
#[derive(Debug, Clone)]
pub struct AttackReport {
    /// Terminal outcome.
    pub outcome: AttackOutcome,
    /// Detector queries made.
    pub probes: usize,
    /// Transformations that changed the image.
    pub modifications: usize,
    /// Samples changed across all modifications.
    pub samples_changed: usize,
    /// The image as last probed.
    pub image: RgbImage,
    /// The detector's last answer.
    pub detection: Detection,
    /// Every answer in probe order; the last one equals `detection`.
    pub history: Vec<Detection>,
}

impl AttackReport {
    /// True if the final image passes as clean.
    pub fn is_success(&self) -> bool {
        self.outcome == AttackOutcome::Evaded
    }

    /// True if the attack stopped because the budget ran out.
    pub fn budget_exhausted(&self) -> bool {
        self.outcome == AttackOutcome::BudgetExhausted
    }
}

/// Drives an [`RsDetector`] as an oracle.
pub struct OracleAttack<'a> {
    detector: &'a RsDetector,
    budget: usize,
}

impl<'a> OracleAttack<'a> {
    /// Creates an attack allowed at most `budget` modifications.
    pub fn new(detector: &'a RsDetector, budget: usize) -> Self {
        Self { detector, budget }
    }

    /// Returns the modification budget.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Runs the attack. The input image is never modified.
    pub fn run(&self, image: &RgbImage) -> Result<AttackReport, RsError> {
        let mut current = image.clone();
        let mut detection = self.detector.inspect(&current)?;
        let mut history = vec![detection.clone()];
        let mut probes = 1;
        let mut modifications = 0;
        let mut samples_changed = 0;

        // Probing until one of the terminal outcomes is reached.
        let outcome = loop {
            if !detection.stego {
                break AttackOutcome::Evaded;
            }
            if modifications >= self.budget {
                break AttackOutcome::BudgetExhausted;
            }

            let (next, changed) = current.with_lsb_cleared();
            if changed == 0 {
                break AttackOutcome::Converged;
            }

            modifications += 1;
            samples_changed += changed;
            current = next;
            tracing::trace!(modifications, changed, "Cleared LSBs");

            detection = self.detector.inspect(&current)?;
            history.push(detection.clone());
            probes += 1;
        };

        match outcome {
            AttackOutcome::Evaded => tracing::info!(
                probes,
                modifications,
                samples_changed,
                "Oracle attack: {}",
                outcome
            ),
            _ => tracing::warn!(
                probes,
                modifications,
                trigger = ?detection.trigger,
                "Oracle attack: {}",
                outcome
            ),
        }

        Ok(AttackReport {
            outcome,
            probes,
            modifications,
            samples_changed,
            image: current,
            detection,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Channel;
    use crate::rs::{Mask, RsAnalyzer};

    fn uniform_image(channel: Channel) -> RgbImage {
        RgbImage::from_channels(channel.clone(), channel.clone(), channel).unwrap()
    }

    /// Each 8-pixel row is [first, rest, rest, ...].
    fn step_image(first: u8, rest: u8) -> RgbImage {
        let row: Vec<u8> = std::iter::once(first)
            .chain(std::iter::repeat(rest).take(7))
            .collect();
        let samples = row.repeat(8);
        uniform_image(Channel::new(samples, 8, 8).unwrap())
    }

    fn first_column_detector() -> RsDetector {
        let rows: Vec<[u8; 8]> = vec![[1, 0, 0, 0, 0, 0, 0, 0]; 8];
        let analyzer = RsAnalyzer::new(Mask::from_rows(&rows).unwrap());
        RsDetector::new(analyzer, 0.1).unwrap()
    }

    fn full_mask_detector() -> RsDetector {
        let analyzer = RsAnalyzer::new(Mask::filled(8, 8, true).unwrap());
        RsDetector::new(analyzer, 0.1).unwrap()
    }

    #[test]
    fn test_clean_image_single_probe() {
        let image = uniform_image(Channel::filled(8, 8, 0).unwrap());
        let detector = full_mask_detector();

        let report = OracleAttack::new(&detector, DEFAULT_BUDGET).run(&image).unwrap();
        assert_eq!(report.outcome, AttackOutcome::Evaded);
        assert_eq!(report.probes, 1);
        assert_eq!(report.modifications, 0);
        assert_eq!(report.image, image);
    }

    #[test]
    fn test_converges_when_nothing_to_clear() {
        // [101, 51, ...] then [100, 50, ...] both stay detected under a
        // first-column mask; the second clear changes nothing.
        let detector = first_column_detector();
        let report = OracleAttack::new(&detector, DEFAULT_BUDGET)
            .run(&step_image(101, 51))
            .unwrap();

        assert_eq!(report.outcome, AttackOutcome::Converged);
        assert_eq!(report.probes, 2);
        assert_eq!(report.modifications, 1);
        assert!(!report.is_success());
        assert!(report.detection.stego);
        assert_eq!(report.history.len(), report.probes);
        assert!(report.history.iter().all(|d| d.stego));
    }

    #[test]
    fn test_zero_budget_exhausted() {
        let detector = first_column_detector();
        let report = OracleAttack::new(&detector, 0).run(&step_image(101, 51)).unwrap();

        assert!(report.budget_exhausted());
        assert_eq!(report.probes, 1);
        assert_eq!(report.modifications, 0);
    }
}
