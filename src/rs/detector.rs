//! RS threshold detector.
//!
//! Declares an image stego-likely when any channel's regular or singular
//! masses under the mask and the negated mask differ by more than a
//! threshold. This is a single global test, not a calibrated classifier.

use super::block::RsError;
use super::classify::{RsAnalyzer, RsSignature};
use crate::image::{ChannelKind, RgbImage};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Default divergence threshold.
pub const DEFAULT_RS_THRESHOLD: f64 = 0.1;

/// RS signature of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSignature {
    /// Channel analysed.
    pub channel: ChannelKind,
    /// Its group masses.
    pub signature: RsSignature,
}

/// Mass divergence that triggered a stego verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Divergence {
    /// Regular masses diverge.
    #[error("{channel}: |Rm - R-m| = {gap:.4} exceeds threshold {threshold:.4}")]
    Regular {
        /// Diverging channel.
        channel: ChannelKind,
        /// `|Rm - R-m|`.
        gap: f64,
        /// Threshold in force.
        threshold: f64,
    },

    /// Singular masses diverge.
    #[error("{channel}: |Sm - S-m| = {gap:.4} exceeds threshold {threshold:.4}")]
    Singular {
        /// Diverging channel.
        channel: ChannelKind,
        /// `|Sm - S-m|`.
        gap: f64,
        /// Threshold in force.
        threshold: f64,
    },
}

/// Verdict plus the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// True if the image is likely to carry LSB-embedded data.
    pub stego: bool,
    /// First divergence found, if any.
    pub trigger: Option<Divergence>,
    /// One signature per channel, in R, G, B order.
    pub signatures: Vec<ChannelSignature>,
}

/// Threshold detector over RS signatures.
#[derive(Debug)]
pub struct RsDetector {
    analyzer: RsAnalyzer,
    threshold: f64,
}

impl RsDetector {
    /// Creates a detector with the given divergence threshold.
    pub fn new(analyzer: RsAnalyzer, threshold: f64) -> Result<Self, RsError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(RsError::InvalidThreshold(threshold));
        }
        Ok(Self {
            analyzer,
            threshold,
        })
    }

    /// Returns the threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the analyzer.
    pub fn analyzer(&self) -> &RsAnalyzer {
        &self.analyzer
    }

    /// Checks signatures against the threshold.
    ///
    /// Returns the first divergence found, in channel order.
    pub fn check(&self, signatures: &[ChannelSignature]) -> Result<(), Divergence> {
        for &ChannelSignature { channel, signature } in signatures {
            let gap = signature.regular_gap();
            if gap > self.threshold {
                return Err(Divergence::Regular {
                    channel,
                    gap,
                    threshold: self.threshold,
                });
            }
            let gap = signature.singular_gap();
            if gap > self.threshold {
                return Err(Divergence::Singular {
                    channel,
                    gap,
                    threshold: self.threshold,
                });
            }
        }
        Ok(())
    }

    /// True if any channel diverges beyond the threshold.
    pub fn is_stego(&self, signatures: &[ChannelSignature]) -> bool {
        self.check(signatures).is_err()
    }

    /// Computes the signatures of every channel.
    ///
    /// Pads the image to the mask shape first if needed.
    pub fn signatures(&self, image: &RgbImage) -> Result<Vec<ChannelSignature>, RsError> {
        let (rows, cols) = self.analyzer.mask().shape();
        let image = if image.is_multiple_of(rows, cols) {
            Cow::Borrowed(image)
        } else {
            tracing::debug!(
                width = image.width(),
                height = image.height(),
                rows,
                cols,
                "Padding image to mask shape"
            );
            Cow::Owned(image.padded_to_multiple(rows, cols))
        };

        image
            .channels()
            .map(|(channel, data)| {
                self.analyzer
                    .signature(data)
                    .map(|signature| ChannelSignature { channel, signature })
            })
            .collect()
    }

    /// Analyzes an image and returns the verdict with its evidence.
    pub fn inspect(&self, image: &RgbImage) -> Result<Detection, RsError> {
        let signatures = self.signatures(image)?;
        let trigger = self.check(&signatures).err();

        match &trigger {
            Some(divergence) => tracing::debug!(%divergence, "RS detector: stego-likely"),
            None => tracing::debug!(threshold = self.threshold, "RS detector: clean"),
        }

        Ok(Detection {
            stego: trigger.is_some(),
            trigger,
            signatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Channel;
    use crate::rs::mask::Mask;

    fn sig(rm: f64, sm: f64, r_neg_m: f64, s_neg_m: f64) -> ChannelSignature {
        ChannelSignature {
            channel: ChannelKind::Green,
            signature: RsSignature {
                rm,
                sm,
                r_neg_m,
                s_neg_m,
                blocks: 10,
            },
        }
    }

    fn detector() -> RsDetector {
        let analyzer = RsAnalyzer::new(Mask::filled(8, 8, true).unwrap());
        RsDetector::new(analyzer, DEFAULT_RS_THRESHOLD).unwrap()
    }

    #[test]
    fn test_close_masses_clean() {
        assert!(detector().check(&[sig(0.6, 0.2, 0.65, 0.22)]).is_ok());
    }

    #[test]
    fn test_regular_gap_triggers() {
        assert!(matches!(
            detector().check(&[sig(0.7, 0.2, 0.5, 0.2)]),
            Err(Divergence::Regular { channel: ChannelKind::Green, .. })
        ));
    }

    #[test]
    fn test_singular_gap_triggers() {
        assert!(matches!(
            detector().check(&[sig(0.5, 0.1, 0.5, 0.3)]),
            Err(Divergence::Singular { .. })
        ));
    }

    #[test]
    fn test_gap_equal_to_threshold_is_clean() {
        // Strictly greater is required.
        let analyzer = RsAnalyzer::new(Mask::filled(8, 8, true).unwrap());
        let detector = RsDetector::new(analyzer, 0.25).unwrap();

        assert!(!detector.is_stego(&[sig(0.75, 0.0, 0.5, 0.0)]));
        assert!(detector.is_stego(&[sig(0.875, 0.0, 0.5, 0.0)]));
    }

    #[test]
    fn test_invalid_threshold() {
        let analyzer = RsAnalyzer::new(Mask::filled(2, 2, true).unwrap());
        assert!(matches!(
            RsDetector::new(analyzer, f64::INFINITY),
            Err(RsError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_inspect_pads_unaligned_image() {
        let channel = Channel::filled(10, 9, 0).unwrap();
        let image = RgbImage::from_channels(channel.clone(), channel.clone(), channel).unwrap();

        let detection = detector().inspect(&image).unwrap();
        assert!(!detection.stego);
        assert_eq!(detection.signatures.len(), 3);
        assert_eq!(detection.signatures[0].signature.blocks, 4);
    }
}
