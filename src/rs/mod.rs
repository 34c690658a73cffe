//! RS (Regular/Singular groups) steganalysis.
//!
//! Each channel is split into mask-sized blocks. A block's noise is
//! compared before and after flipping the LSBs selected by the mask (and by
//! its complement); the fractions of blocks that get rougher (Regular) or
//! smoother (Singular) form the channel's RS signature.

mod block;
mod classify;
mod detector;
mod mask;
mod noise;

pub use block::{flip, Blocks, FlipDirection, RsError};
pub use classify::{GroupClass, RsAnalyzer, RsSignature};
pub use detector::{ChannelSignature, Detection, Divergence, RsDetector, DEFAULT_RS_THRESHOLD};
pub use mask::{Mask, MaskError, DEFAULT_MASK_COLS, DEFAULT_MASK_ROWS};
pub use noise::{Discriminator, GridDifference, NoiseKind, RowDifference};
