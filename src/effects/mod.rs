//! Temporal effects between published frames.

pub mod morph;

pub use morph::{morph, rgb_to_ycbcr, ycbcr_to_rgb};
