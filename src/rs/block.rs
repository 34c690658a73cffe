//! Block partitioning and LSB flipping.

use super::mask::Mask;
use crate::image::Channel;
use thiserror::Error;

/// Errors from RS analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RsError {
    /// Channel dimensions are not multiples of the mask shape.
    #[error("channel {width}x{height} is not a multiple of mask {mask_cols}x{mask_rows}")]
    MaskShapeMismatch {
        /// Channel width.
        width: usize,
        /// Channel height.
        height: usize,
        /// Mask rows.
        mask_rows: usize,
        /// Mask columns.
        mask_cols: usize,
    },
    /// The channel is smaller than one block.
    #[error("channel holds no complete block")]
    EmptyChannel,
    /// Divergence threshold is negative or not finite.
    #[error("invalid RS threshold {0}")]
    InvalidThreshold(f64),
}

/// Direction of the flip function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    /// Flip where the mask is 1.
    Positive,
    /// Flip where the mask is 0.
    Negative,
}

/// Toggles the LSB of every sample selected by the mask for `direction`.
///
/// `block` is row-major with the mask's shape.
pub fn flip(block: &[u8], mask: &Mask, direction: FlipDirection) -> Vec<u8> {
    let target = direction == FlipDirection::Positive;
    block
        .iter()
        .zip(mask.bits())
        .map(|(&v, &bit)| if bit == target { v ^ 1 } else { v })
        .collect()
}

/// Iterator over the mask-sized blocks of a channel, in row-major block order.
pub struct Blocks<'a> {
    channel: &'a Channel,
    rows: usize,
    cols: usize,
    next: usize,
    count: usize,
}

impl<'a> Blocks<'a> {
    /// Partitions a channel whose dimensions are multiples of the mask shape.
    pub fn new(channel: &'a Channel, mask: &Mask) -> Result<Self, RsError> {
        let (rows, cols) = mask.shape();
        if !channel.is_multiple_of(rows, cols) {
            return Err(RsError::MaskShapeMismatch {
                width: channel.width(),
                height: channel.height(),
                mask_rows: rows,
                mask_cols: cols,
            });
        }
        let count = (channel.width() / cols) * (channel.height() / rows);
        if count == 0 {
            return Err(RsError::EmptyChannel);
        }
        Ok(Self {
            channel,
            rows,
            cols,
            next: 0,
            count,
        })
    }

    /// Total number of blocks.
    pub fn count_blocks(&self) -> usize {
        self.count
    }
}

impl Iterator for Blocks<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.next >= self.count {
            return None;
        }
        let per_row = self.channel.width() / self.cols;
        let top = (self.next / per_row) * self.rows;
        let left = (self.next % per_row) * self.cols;
        self.next += 1;

        let width = self.channel.width();
        let samples = self.channel.samples();
        let mut block = Vec::with_capacity(self.rows * self.cols);
        for y in top..top + self.rows {
            let start = y * width + left;
            block.extend_from_slice(&samples[start..start + self.cols]);
        }
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Blocks<'_> {}
