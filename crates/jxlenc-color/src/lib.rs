//! Color space transformations
//!
//! Scalar reference math for the encoder's color kernels:
//! - RGB <-> XYB (the perceptual opsin transform)
//! - RGB <-> YCbCr (BT.601 full range)
//! - sRGB <-> linear transfer

pub mod srgb;
pub mod xyb;
pub mod ycbcr;

pub use srgb::*;
pub use xyb::*;
pub use ycbcr::*;
