//! Constants used throughout the encoder

/// Maximum supported image dimension
pub const MAX_IMAGE_DIMENSION: u32 = 268435456; // 2^28

/// DCT block edge length
pub const BLOCK_SIZE: usize = 8;

/// Samples per 8x8 block
pub const BLOCK_AREA: usize = BLOCK_SIZE * BLOCK_SIZE;

/// Maximum number of channels (color + alpha)
pub const MAX_CHANNELS: usize = 4;

/// Default quality for lossy encoding (0-100)
pub const DEFAULT_QUALITY: u8 = 90;

/// Quality used by the `fast` preset
pub const FAST_QUALITY: u8 = 75;

/// Quality used by the `high_quality` preset
pub const HIGH_QUALITY: u8 = 95;
