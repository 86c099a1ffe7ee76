//! Encoder configuration

use crate::consts::{DEFAULT_QUALITY, FAST_QUALITY, HIGH_QUALITY};

/// Coding path selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Modular path, bit-exact reconstruction
    Lossless,
    /// VarDCT path at the given quality (0-100, higher is better)
    Lossy { quality: u8 },
}

/// Compute/density trade-off, from fastest to densest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effort {
    Lightning,
    Falcon,
    Cheetah,
    Hare,
    Squirrel,
    Kitten,
}

impl Effort {
    /// Squeeze levels the lossless path applies at this tier
    pub fn squeeze_levels(&self) -> u8 {
        match self {
            Effort::Lightning | Effort::Falcon => 0,
            Effort::Cheetah | Effort::Hare => 1,
            Effort::Squirrel => 2,
            Effort::Kitten => 3,
        }
    }

    /// Whether the lossy path modulates quantization by block activity
    pub fn adaptive_quantization(&self) -> bool {
        *self >= Effort::Cheetah
    }
}

/// Color decorrelation used by the lossy path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorTransform {
    /// Perceptual opsin transform (default)
    Xyb,
    /// BT.601 full-range luma/chroma
    YCbCr,
}

/// Encoder options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodingOptions {
    /// Lossless or lossy coding path
    pub mode: Mode,
    /// Compute/density trade-off
    pub effort: Effort,
    /// Emit a multi-pass stream (coarse first)
    pub progressive: bool,
    /// Entropy coder: ANS when true, prefix codes otherwise
    pub use_ans: bool,
    /// Allow SIMD backends; scalar only when false
    pub use_hardware_acceleration: bool,
    /// Allow the platform vector library backend where present
    pub use_accelerate: bool,
    /// Color transform for the lossy path
    pub color_transform: ColorTransform,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Lossless,
            effort: Effort::Squirrel,
            progressive: false,
            use_ans: true,
            use_hardware_acceleration: true,
            use_accelerate: cfg!(target_os = "macos"),
            color_transform: ColorTransform::Xyb,
        }
    }
}

impl EncodingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast lossy preset: quality 75, Falcon effort
    pub fn fast() -> Self {
        Self::default()
            .mode(Mode::Lossy {
                quality: FAST_QUALITY,
            })
            .effort(Effort::Falcon)
    }

    /// Dense lossy preset: quality 95, Kitten effort
    pub fn high_quality() -> Self {
        Self::default()
            .mode(Mode::Lossy {
                quality: HIGH_QUALITY,
            })
            .effort(Effort::Kitten)
    }

    /// Lossless preset: Modular path, Squirrel effort
    pub fn lossless() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = match mode {
            Mode::Lossy { quality } => Mode::Lossy {
                quality: quality.min(100),
            },
            m => m,
        };
        self
    }

    /// Lossy mode at the default quality
    pub fn lossy(self) -> Self {
        self.mode(Mode::Lossy {
            quality: DEFAULT_QUALITY,
        })
    }

    pub fn effort(mut self, effort: Effort) -> Self {
        self.effort = effort;
        self
    }

    pub fn progressive(mut self, progressive: bool) -> Self {
        self.progressive = progressive;
        self
    }

    pub fn use_ans(mut self, use_ans: bool) -> Self {
        self.use_ans = use_ans;
        self
    }

    pub fn use_hardware_acceleration(mut self, enabled: bool) -> Self {
        self.use_hardware_acceleration = enabled;
        self
    }

    pub fn use_accelerate(mut self, enabled: bool) -> Self {
        self.use_accelerate = enabled;
        self
    }

    pub fn color_transform(mut self, transform: ColorTransform) -> Self {
        self.color_transform = transform;
        self
    }

    pub fn is_lossless(&self) -> bool {
        matches!(self.mode, Mode::Lossless)
    }
}
