//! Regular/Singular group classification and aggregation.

use super::block::{flip, Blocks, FlipDirection, RsError};
use super::mask::Mask;
use super::noise::{Discriminator, NoiseKind};
use crate::image::Channel;
use serde::{Deserialize, Serialize};

/// Response of a block to one flip direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupClass {
    /// Flipping increased the noise.
    Regular,
    /// Flipping decreased the noise.
    Singular,
    /// Flipping left the noise unchanged.
    Unusable,
}

impl GroupClass {
    /// Classifies by comparing noise before (`f0`) and after (`f1`) flipping.
    pub fn from_noise(f0: u64, f1: u64) -> Self {
        match f1.cmp(&f0) {
            std::cmp::Ordering::Greater => GroupClass::Regular,
            std::cmp::Ordering::Less => GroupClass::Singular,
            std::cmp::Ordering::Equal => GroupClass::Unusable,
        }
    }
}

/// Relative group masses of one channel.
///
/// Unusable blocks count towards the total but towards neither mass, so
/// `rm + sm <= 1` and `r_neg_m + s_neg_m <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsSignature {
    /// Regular fraction under the mask.
    pub rm: f64,
    /// Singular fraction under the mask.
    pub sm: f64,
    /// Regular fraction under the negated mask.
    pub r_neg_m: f64,
    /// Singular fraction under the negated mask.
    pub s_neg_m: f64,
    /// Number of blocks analyzed.
    pub blocks: usize,
}

impl RsSignature {
    /// `|Rm - R-m|`.
    #[inline]
    pub fn regular_gap(&self) -> f64 {
        (self.rm - self.r_neg_m).abs()
    }

    /// `|Sm - S-m|`.
    #[inline]
    pub fn singular_gap(&self) -> f64 {
        (self.sm - self.s_neg_m).abs()
    }
}

#[derive(Default)]
struct GroupCounts {
    regular: usize,
    singular: usize,
}

impl GroupCounts {
    fn add(&mut self, class: GroupClass) {
        match class {
            GroupClass::Regular => self.regular += 1,
            GroupClass::Singular => self.singular += 1,
            GroupClass::Unusable => {}
        }
    }
}

/// Computes RS signatures for channels under a fixed mask.
pub struct RsAnalyzer {
    mask: Mask,
    discriminator: Box<dyn Discriminator + Send + Sync>,
}

impl RsAnalyzer {
    /// Creates an analyzer using row differences as the noise measure.
    pub fn new(mask: Mask) -> Self {
        Self::with_discriminator(mask, NoiseKind::default().discriminator())
    }

    /// Creates an analyzer with a custom noise measure.
    pub fn with_discriminator(mask: Mask, discriminator: Box<dyn Discriminator + Send + Sync>) -> Self {
        Self {
            mask,
            discriminator,
        }
    }

    /// Returns the flipping mask.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Returns the noise measure's name.
    pub fn discriminator_name(&self) -> &'static str {
        self.discriminator.name()
    }

    /// Classifies one block under the positive and negative flips.
    pub fn classify_block(&self, block: &[u8]) -> (GroupClass, GroupClass) {
        let cols = self.mask.cols();
        let f0 = self.discriminator.noise(block, cols);
        let classify = |direction| {
            let flipped = flip(block, &self.mask, direction);
            GroupClass::from_noise(f0, self.discriminator.noise(&flipped, cols))
        };
        (
            classify(FlipDirection::Positive),
            classify(FlipDirection::Negative),
        )
    }

    /// Computes the RS signature of a channel.
    ///
    /// The channel must already be a multiple of the mask shape.
    pub fn signature(&self, channel: &Channel) -> Result<RsSignature, RsError> {
        let blocks = Blocks::new(channel, &self.mask)?;
        let total = blocks.count_blocks();

        let mut positive = GroupCounts::default();
        let mut negative = GroupCounts::default();
        for block in blocks {
            let (pos, neg) = self.classify_block(&block);
            positive.add(pos);
            negative.add(neg);
        }

        let n = total as f64;
        let signature = RsSignature {
            rm: positive.regular as f64 / n,
            sm: positive.singular as f64 / n,
            r_neg_m: negative.regular as f64 / n,
            s_neg_m: negative.singular as f64 / n,
            blocks: total,
        };

        tracing::trace!(
            blocks = total,
            rm = signature.rm,
            sm = signature.sm,
            r_neg_m = signature.r_neg_m,
            s_neg_m = signature.s_neg_m,
            "RS signature"
        );

        Ok(signature)
    }
}

impl std::fmt::Debug for RsAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsAnalyzer")
            .field("mask", &self.mask)
            .field("discriminator", &self.discriminator.name())
            .finish()
    }
}
