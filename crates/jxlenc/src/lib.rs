//! # jxlenc - JPEG XL encoder core
//!
//! A JPEG XL encoder with two coding paths and runtime SIMD dispatch:
//!
//! - **VarDCT** (lossy): XYB or YCbCr color transform, 8x8 DCT,
//!   activity-modulated quantization, zigzag scan, entropy coding.
//! - **Modular** (lossless): reversible color transform, squeeze
//!   lifting steps, MED prediction, entropy coding of residuals.
//!
//! Kernels are dispatched at runtime to the best available backend
//! (scalar, NEON, SSE2, AVX2, or the platform vector library); all
//! backends produce equivalent results.
//!
//! ## Quick start
//!
//! ```
//! use jxlenc::{
//!     AlphaMode, ColorSpace, EncodingOptions, ImageFrame, JxlEncoder, PixelType,
//! };
//!
//! let mut frame = ImageFrame::new(
//!     64,
//!     64,
//!     3,
//!     PixelType::U8,
//!     ColorSpace::Srgb,
//!     8,
//!     false,
//!     AlphaMode::None,
//! )
//! .unwrap();
//! for y in 0..64 {
//!     for x in 0..64 {
//!         let v = (((x + y) * 32 % 256) as u16) << 8;
//!         for c in 0..3 {
//!             frame.set_pixel(x, y, c, v).unwrap();
//!         }
//!     }
//! }
//!
//! let encoder = JxlEncoder::new(EncodingOptions::lossless());
//! let result = encoder.encode(&frame).unwrap();
//! assert_eq!(&result.data[..2], &[0xFF, 0x0A]);
//! ```

pub mod decode;
pub mod encoder;
pub mod header;
pub mod modular;
pub mod progressive;
pub mod vardct;

pub use encoder::JxlEncoder;
pub use jxlenc_core::{
    AlphaMode, ColorPrimaries, ColorSpace, ColorTransform, Effort, EncoderError, EncoderResult,
    EncodingOptions, EncodingResult, EncodingStats, ImageFrame, Mode, Orientation, PixelType,
    TransferFunction,
};
pub use jxlenc_kernels::{CpuArchitecture, DispatchBackend, HardwareCapabilities};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
