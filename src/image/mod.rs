//! Pixel data handed over by the external image collaborator.
//!
//! This module splits interleaved RGB buffers into per-channel grids and
//! provides sources of images. It does not decode image files.

mod channel;
mod source;

pub use channel::{Channel, ChannelKind, ImageError, RgbImage};
pub use source::{ImageSource, MemorySource, SourceError, SyntheticConfig, SyntheticSource};
