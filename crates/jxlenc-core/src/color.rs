//! Color signaling: primaries, transfer functions, and color spaces

/// CIE xy chromaticity coordinates for the three primaries and white point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPrimaries {
    pub red_x: f32,
    pub red_y: f32,
    pub green_x: f32,
    pub green_y: f32,
    pub blue_x: f32,
    pub blue_y: f32,
    pub white_x: f32,
    pub white_y: f32,
}

impl ColorPrimaries {
    /// sRGB / BT.709 primaries with D65 white
    pub const SRGB: ColorPrimaries = ColorPrimaries {
        red_x: 0.64,
        red_y: 0.33,
        green_x: 0.30,
        green_y: 0.60,
        blue_x: 0.15,
        blue_y: 0.06,
        white_x: 0.3127,
        white_y: 0.3290,
    };

    /// Display P3 primaries with D65 white
    pub const DISPLAY_P3: ColorPrimaries = ColorPrimaries {
        red_x: 0.680,
        red_y: 0.320,
        green_x: 0.265,
        green_y: 0.690,
        blue_x: 0.150,
        blue_y: 0.060,
        white_x: 0.3127,
        white_y: 0.3290,
    };

    /// Rec. 2020 primaries with D65 white
    pub const REC2020: ColorPrimaries = ColorPrimaries {
        red_x: 0.708,
        red_y: 0.292,
        green_x: 0.170,
        green_y: 0.797,
        blue_x: 0.131,
        blue_y: 0.046,
        white_x: 0.3127,
        white_y: 0.3290,
    };
}

/// Opto-electronic transfer function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferFunction {
    /// sRGB piecewise curve
    Srgb,
    /// Linear light
    Linear,
    /// SMPTE ST 2084 perceptual quantizer
    Pq,
    /// Hybrid log-gamma
    Hlg,
    /// Pure power-law gamma
    Gamma(f32),
}

impl TransferFunction {
    /// Small integer used when signaling the transfer in the header
    pub fn raw_value(&self) -> u8 {
        match self {
            TransferFunction::Srgb => 0,
            TransferFunction::Linear => 1,
            TransferFunction::Pq => 2,
            TransferFunction::Hlg => 3,
            TransferFunction::Gamma(_) => 4,
        }
    }
}

/// Color space of an [`crate::ImageFrame`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSpace {
    /// sRGB primaries and transfer
    Srgb,
    /// Single-channel grayscale
    Grayscale,
    /// Explicit primaries and transfer function
    Custom {
        primaries: ColorPrimaries,
        transfer: TransferFunction,
    },
}

impl ColorSpace {
    /// Display P3 with the sRGB transfer curve
    pub fn display_p3() -> Self {
        ColorSpace::Custom {
            primaries: ColorPrimaries::DISPLAY_P3,
            transfer: TransferFunction::Srgb,
        }
    }

    /// Display P3 with linear transfer
    pub fn display_p3_linear() -> Self {
        ColorSpace::Custom {
            primaries: ColorPrimaries::DISPLAY_P3,
            transfer: TransferFunction::Linear,
        }
    }

    /// Rec. 2020 with the PQ transfer curve
    pub fn rec2020_pq() -> Self {
        ColorSpace::Custom {
            primaries: ColorPrimaries::REC2020,
            transfer: TransferFunction::Pq,
        }
    }

    /// Rec. 2020 with the HLG transfer curve
    pub fn rec2020_hlg() -> Self {
        ColorSpace::Custom {
            primaries: ColorPrimaries::REC2020,
            transfer: TransferFunction::Hlg,
        }
    }

    /// Rec. 2020 with linear transfer
    pub fn rec2020_linear() -> Self {
        ColorSpace::Custom {
            primaries: ColorPrimaries::REC2020,
            transfer: TransferFunction::Linear,
        }
    }

    /// Whether this color space carries a single luminance component
    pub fn is_grayscale(&self) -> bool {
        matches!(self, ColorSpace::Grayscale)
    }

    /// The transfer function signaled by this color space
    pub fn transfer(&self) -> TransferFunction {
        match self {
            ColorSpace::Srgb | ColorSpace::Grayscale => TransferFunction::Srgb,
            ColorSpace::Custom { transfer, .. } => *transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries_ordering() {
        // Wider gamuts push the red primary further right and green further up.
        assert!(ColorPrimaries::REC2020.red_x > ColorPrimaries::DISPLAY_P3.red_x);
        assert!(ColorPrimaries::DISPLAY_P3.red_x > ColorPrimaries::SRGB.red_x);
        assert!(ColorPrimaries::REC2020.green_y > ColorPrimaries::DISPLAY_P3.green_y);
    }

    #[test]
    fn test_predefined_compositions() {
        match ColorSpace::rec2020_pq() {
            ColorSpace::Custom { primaries, transfer } => {
                assert_eq!(primaries, ColorPrimaries::REC2020);
                assert_eq!(transfer, TransferFunction::Pq);
            }
            other => panic!("unexpected color space {:?}", other),
        }
        assert_eq!(
            ColorSpace::display_p3_linear().transfer(),
            TransferFunction::Linear
        );
    }
}
