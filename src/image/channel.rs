//! Channel and RGB image types.
//!
//! A [`Channel`] is one colour plane as a row-major grid of 8-bit samples.
//! Channels are never mutated in place: every transformation returns a new
//! grid so that a caller comparing before/after still holds the original.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while building channels and images.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Buffer length does not match the dimensions.
    #[error("buffer holds {got} samples, expected {expected}")]
    BufferSize {
        /// Samples supplied.
        got: usize,
        /// Samples the dimensions call for.
        expected: usize,
    },
    /// Width or height is zero.
    #[error("image has zero width or height")]
    EmptyImage,
    /// Channels of one image have different dimensions.
    #[error("channel shapes differ: {0}")]
    ChannelShape(String),
}

/// Colour plane of an RGB image, in buffer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// First sample of each pixel.
    Red,
    /// Second sample of each pixel.
    Green,
    /// Third sample of each pixel.
    Blue,
}

impl ChannelKind {
    /// All channels in interleaved buffer order.
    pub const ALL: [ChannelKind; 3] = [ChannelKind::Red, ChannelKind::Green, ChannelKind::Blue];

    /// Position of this channel in an interleaved pixel.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ChannelKind::Red => 0,
            ChannelKind::Green => 1,
            ChannelKind::Blue => 2,
        }
    }

    /// Lowercase label, used for metric labels and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Red => "red",
            ChannelKind::Green => "green",
            ChannelKind::Blue => "blue",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single colour plane.
#[derive(Clone, PartialEq, Eq)]
pub struct Channel {
    /// Row-major samples.
    samples: Vec<u8>,
    /// Width in pixels.
    width: usize,
    /// Height in pixels.
    height: usize,
}

impl Channel {
    /// Creates a channel, checking that the buffer matches the dimensions.
    pub fn new(samples: Vec<u8>, width: usize, height: usize) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyImage);
        }
        let expected = width * height;
        if samples.len() != expected {
            return Err(ImageError::BufferSize {
                got: samples.len(),
                expected,
            });
        }
        Ok(Self {
            samples,
            width,
            height,
        })
    }

    /// Creates a channel with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Result<Self, ImageError> {
        Self::new(vec![value; width * height], width, height)
    }

    /// Returns the samples in row-major order.
    #[inline]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a validated channel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the sample at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.samples[row * self.width + col]
    }

    /// Returns the samples of the first `rows` rows (clamped to the height).
    pub fn row_prefix(&self, rows: usize) -> &[u8] {
        let rows = rows.min(self.height);
        &self.samples[..rows * self.width]
    }

    /// Returns the least significant bit of every sample.
    pub fn lsb_plane(&self) -> Vec<u8> {
        self.samples.iter().map(|&v| v & 1).collect()
    }

    /// Returns true if both dimensions are multiples of the given shape.
    pub fn is_multiple_of(&self, rows: usize, cols: usize) -> bool {
        rows > 0 && cols > 0 && self.height % rows == 0 && self.width % cols == 0
    }

    /// Returns a copy with every LSB cleared and the number of samples changed.
    pub fn with_lsb_cleared(&self) -> (Channel, usize) {
        let changed = self.samples.iter().filter(|&&v| v & 1 == 1).count();
        let samples = self.samples.iter().map(|&v| v & !1).collect();
        (
            Channel {
                samples,
                width: self.width,
                height: self.height,
            },
            changed,
        )
    }

    /// Pads the channel so both dimensions are multiples of the given shape.
    ///
    /// New columns repeat the last column and new rows repeat the last row.
    pub fn padded_to_multiple(&self, rows: usize, cols: usize) -> Channel {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let width = self.width.div_ceil(cols) * cols;
        let height = self.height.div_ceil(rows) * rows;
        if width == self.width && height == self.height {
            return self.clone();
        }

        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            let src_y = y.min(self.height - 1);
            for x in 0..width {
                samples.push(self.get(src_y, x.min(self.width - 1)));
            }
        }

        tracing::trace!(
            from_width = self.width,
            from_height = self.height,
            width,
            height,
            "Padded channel to mask multiple"
        );

        Channel {
            samples,
            width,
            height,
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("samples", &self.samples.len())
            .finish()
    }
}

/// Three-channel image in R, G, B order.
#[derive(Clone, PartialEq, Eq)]
pub struct RgbImage {
    channels: [Channel; 3],
}

impl RgbImage {
    /// Builds an image from an interleaved `height × width × 3` buffer.
    pub fn from_interleaved(data: &[u8], width: usize, height: usize) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyImage);
        }
        let expected = width * height * 3;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                got: data.len(),
                expected,
            });
        }

        let plane = |offset: usize| -> Result<Channel, ImageError> {
            let samples = data.iter().skip(offset).step_by(3).copied().collect();
            Channel::new(samples, width, height)
        };

        Ok(Self {
            channels: [plane(0)?, plane(1)?, plane(2)?],
        })
    }

    /// Builds an image from three channels of identical shape.
    pub fn from_channels(red: Channel, green: Channel, blue: Channel) -> Result<Self, ImageError> {
        for other in [&green, &blue] {
            if other.width() != red.width() || other.height() != red.height() {
                return Err(ImageError::ChannelShape(format!(
                    "{}x{} vs {}x{}",
                    red.width(),
                    red.height(),
                    other.width(),
                    other.height()
                )));
            }
        }
        Ok(Self {
            channels: [red, green, blue],
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.channels[0].width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.channels[0].height()
    }

    /// Returns one colour plane.
    #[inline]
    pub fn channel(&self, kind: ChannelKind) -> &Channel {
        &self.channels[kind.index()]
    }

    /// Iterates over `(kind, channel)` in buffer order.
    pub fn channels(&self) -> impl Iterator<Item = (ChannelKind, &Channel)> + '_ {
        ChannelKind::ALL.into_iter().zip(self.channels.iter())
    }

    /// Re-interleaves the channels into a `height × width × 3` buffer.
    pub fn to_interleaved(&self) -> Vec<u8> {
        let [r, g, b] = &self.channels;
        r.samples()
            .iter()
            .zip(g.samples())
            .zip(b.samples())
            .flat_map(|((&r, &g), &b)| [r, g, b])
            .collect()
    }

    /// Returns true if every channel divides evenly into the given shape.
    pub fn is_multiple_of(&self, rows: usize, cols: usize) -> bool {
        self.channels[0].is_multiple_of(rows, cols)
    }

    /// Returns a copy with every LSB of every channel cleared, plus the
    /// number of samples that changed.
    pub fn with_lsb_cleared(&self) -> (RgbImage, usize) {
        let mut changed = 0;
        let channels = self.channels.clone().map(|c| {
            let (cleared, n) = c.with_lsb_cleared();
            changed += n;
            cleared
        });
        (RgbImage { channels }, changed)
    }

    /// Pads every channel to the next multiple of the given shape.
    pub fn padded_to_multiple(&self, rows: usize, cols: usize) -> RgbImage {
        RgbImage {
            channels: self.channels.clone().map(|c| c.padded_to_multiple(rows, cols)),
        }
    }
}

impl fmt::Debug for RgbImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RgbImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
