//! Core types for the JPEG XL encoder
//!
//! This crate provides the fundamental data structures shared by every other
//! crate in the workspace: the pixel container, color signaling, encoding
//! options, result statistics, and the error taxonomy.

pub mod color;
pub mod consts;
pub mod error;
pub mod frame;
pub mod options;
pub mod stats;
pub mod types;

pub use color::{ColorPrimaries, ColorSpace, TransferFunction};
pub use error::{EncoderError, EncoderResult};
pub use frame::ImageFrame;
pub use options::{ColorTransform, Effort, EncodingOptions, Mode};
pub use stats::{EncodingResult, EncodingStats, MemoryMeter};
pub use types::{AlphaMode, Orientation, PixelType, Sample};
