//! Image source abstraction.
//!
//! Decoding real image files is left to the caller. Anything that can hand
//! over an interleaved RGB buffer implements [`ImageSource`]; the crate ships
//! an in-memory source and a seeded synthetic source for demos and tests.

use super::{ImageError, RgbImage};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors that can occur while obtaining images.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No more images.
    #[error("image source exhausted")]
    Exhausted,
    /// The source parameters are unusable.
    #[error("invalid source configuration: {0}")]
    ConfigFailed(String),
    /// The buffer does not describe a valid image.
    #[error("invalid image: {0}")]
    Image(#[from] ImageError),
}

/// Trait for image providers.
pub trait ImageSource {
    /// Produces the next image.
    fn next_image(&mut self) -> Result<RgbImage, SourceError>;
}

/// Source backed by images already decoded in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    images: VecDeque<RgbImage>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an interleaved `height × width × 3` buffer.
    pub fn push_interleaved(
        &mut self,
        data: &[u8],
        width: usize,
        height: usize,
    ) -> Result<(), SourceError> {
        self.images
            .push_back(RgbImage::from_interleaved(data, width, height)?);
        Ok(())
    }

    /// Queues an already-built image.
    pub fn push(&mut self, image: RgbImage) {
        self.images.push_back(image);
    }

    /// Number of queued images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True if no image is queued.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSource for MemorySource {
    fn next_image(&mut self) -> Result<RgbImage, SourceError> {
        self.images.pop_front().ok_or(SourceError::Exhausted)
    }
}

/// Parameters for synthetic image generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Amplitude of the sensor noise added before quantization.
    pub noise: u8,
    /// Fraction of samples whose LSB is replaced by a random bit (0.0 to 1.0).
    pub embed_rate: f64,
    /// Seed for the generator.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            noise: 3,
            embed_rate: 0.0,
            seed: 1,
        }
    }
}

impl SyntheticConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.width == 0 || self.height == 0 {
            return Err(SourceError::ConfigFailed("zero image dimensions".into()));
        }
        if !(0.0..=1.0).contains(&self.embed_rate) {
            return Err(SourceError::ConfigFailed(format!(
                "embed rate {} outside [0, 1]",
                self.embed_rate
            )));
        }
        Ok(())
    }
}

/// Generates smooth gradient cover images, optionally with LSB replacement.
///
/// Covers mimic a 7-bit sensor scaled to 8 bits: the noisy gradient is
/// quantized to even values, so every `(2k, 2k+1)` pair of a clean cover is
/// all `2k`. Embedding replaces LSBs with uniform bits, which evens the
/// pairs out.
///
/// Every call to [`ImageSource::next_image`] draws from the same seeded
/// stream, so a fixed seed always reproduces the same image sequence.
#[derive(Debug)]
pub struct SyntheticSource {
    config: SyntheticConfig,
    rng: ChaCha8Rng,
    sequence: u64,
}

impl SyntheticSource {
    /// Creates a source after validating the configuration.
    pub fn new(config: SyntheticConfig) -> Result<Self, SourceError> {
        config.validate()?;
        tracing::info!(
            width = config.width,
            height = config.height,
            embed_rate = config.embed_rate,
            seed = config.seed,
            "Synthetic image source ready"
        );
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            sequence: 0,
        })
    }

    /// Number of images generated so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn cover_sample(&mut self, x: usize, y: usize, channel: usize) -> u8 {
        let SyntheticConfig {
            width,
            height,
            noise,
            ..
        } = self.config;
        // Diagonal ramp over roughly 0..200, shifted per channel.
        let ramp = (x * 120 / width.max(1)) + (y * 80 / height.max(1)) + channel * 20;
        let jitter = if noise == 0 {
            0
        } else {
            self.rng.gen_range(-(noise as i32)..=noise as i32)
        };
        ((ramp as i32 + 16 + jitter).clamp(0, 255) as u8) & !1
    }
}

impl ImageSource for SyntheticSource {
    fn next_image(&mut self) -> Result<RgbImage, SourceError> {
        let SyntheticConfig {
            width,
            height,
            embed_rate,
            ..
        } = self.config;

        let mut data = Vec::with_capacity(width * height * 3);
        let mut embedded = 0usize;
        for y in 0..height {
            for x in 0..width {
                for channel in 0..3 {
                    let mut value = self.cover_sample(x, y, channel);
                    if embed_rate > 0.0 && self.rng.gen_bool(embed_rate) {
                        value = (value & !1) | self.rng.gen_range(0..=1u8);
                        embedded += 1;
                    }
                    data.push(value);
                }
            }
        }

        self.sequence += 1;
        tracing::debug!(
            sequence = self.sequence,
            embedded_samples = embedded,
            "Generated synthetic image"
        );

        Ok(RgbImage::from_interleaved(&data, width, height)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ChannelKind;

    #[test]
    fn test_memory_source_drains() {
        let mut source = MemorySource::new();
        source.push_interleaved(&[0u8; 2 * 2 * 3], 2, 2).unwrap();
        assert_eq!(source.len(), 1);

        assert!(source.next_image().is_ok());
        assert!(matches!(source.next_image(), Err(SourceError::Exhausted)));
    }

    #[test]
    fn test_memory_source_rejects_bad_buffer() {
        let mut source = MemorySource::new();
        assert!(matches!(
            source.push_interleaved(&[0u8; 5], 2, 2),
            Err(SourceError::Image(ImageError::BufferSize { .. }))
        ));
    }

    #[test]
    fn test_synthetic_is_reproducible() {
        let config = SyntheticConfig {
            width: 16,
            height: 16,
            embed_rate: 0.5,
            ..Default::default()
        };
        let a = SyntheticSource::new(config.clone()).unwrap().next_image().unwrap();
        let b = SyntheticSource::new(config).unwrap().next_image().unwrap();

        assert_eq!(a, b);
        assert_eq!(a.width(), 16);
    }

    #[test]
    fn test_cover_is_quantized_to_even_values() {
        let config = SyntheticConfig {
            width: 64,
            height: 64,
            ..Default::default()
        };
        let cover = SyntheticSource::new(config).unwrap().next_image().unwrap();

        for (_, channel) in cover.channels() {
            assert!(channel.samples().iter().all(|v| v & 1 == 0));
        }
        // Still a textured image, not a flat one
        let distinct: std::collections::HashSet<u8> =
            cover.channel(ChannelKind::Red).samples().iter().copied().collect();
        assert!(distinct.len() > 20);
    }

    #[test]
    fn test_full_embedding_sets_about_half_the_lsbs() {
        let config = SyntheticConfig {
            width: 64,
            height: 64,
            embed_rate: 1.0,
            ..Default::default()
        };
        let stego = SyntheticSource::new(config).unwrap().next_image().unwrap();

        let (_, changed) = stego.with_lsb_cleared();
        let total = 64 * 64 * 3;
        assert!(changed > total * 2 / 5 && changed < total * 3 / 5);
    }

    #[test]
    fn test_invalid_embed_rate() {
        let config = SyntheticConfig {
            embed_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            SyntheticSource::new(config),
            Err(SourceError::ConfigFailed(_))
        ));
    }
}
