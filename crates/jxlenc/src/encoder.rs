//! Top-level encoder orchestration

use std::time::Instant;

use jxlenc_bitstream::BitstreamWriter;
use jxlenc_core::{
    EncoderError, EncoderResult, EncodingOptions, EncodingResult, EncodingStats, ImageFrame,
    MemoryMeter, Mode, PixelType, TransferFunction,
};
use jxlenc_kernels::DispatchBackend;

use crate::{header, modular::ModularEncoder, vardct::VarDctEncoder};

/// JPEG XL encoder
///
/// Stateless with respect to frames: one instance can encode any number
/// of frames, sequentially or from different threads.
pub struct JxlEncoder {
    options: EncodingOptions,
}

impl JxlEncoder {
    pub fn new(options: EncodingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncodingOptions {
        &self.options
    }

    /// The kernel backend this encoder will dispatch to
    pub fn backend(&self) -> DispatchBackend {
        DispatchBackend::for_options(
            self.options.use_hardware_acceleration,
            self.options.use_accelerate,
        )
    }

    /// Encode one frame into a complete bitstream
    pub fn encode(&self, frame: &ImageFrame) -> EncoderResult<EncodingResult> {
        self.validate(frame)?;

        let start = Instant::now();
        let mut meter = MemoryMeter::new();
        let mut writer = BitstreamWriter::new();
        let kernels = self.backend().ops();

        let modular = self.options.is_lossless();
        header::write_header(&mut writer, frame, modular)?;

        match self.options.mode {
            Mode::Lossless => {
                ModularEncoder::new(&self.options, kernels).encode(frame, &mut writer, &mut meter)?
            }
            Mode::Lossy { quality } => VarDctEncoder::new(&self.options, kernels).encode(
                frame,
                quality,
                &mut writer,
                &mut meter,
            )?,
        }

        let data = writer.into_bytes();
        let original_size = frame.data().len();
        let compressed_size = data.len();
        if compressed_size == 0 {
            return Err(EncoderError::internal("empty bitstream"));
        }

        Ok(EncodingResult {
            data,
            stats: EncodingStats {
                original_size,
                compressed_size,
                compression_ratio: original_size as f64 / compressed_size as f64,
                encoding_time: start.elapsed(),
                peak_memory: meter.peak(),
            },
        })
    }

    /// The single source of `InvalidInput`/`Unsupported` for an encode
    fn validate(&self, frame: &ImageFrame) -> EncoderResult<()> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(EncoderError::invalid_input("zero image dimension"));
        }
        if frame.channels() == 0 || frame.channels() > 4 {
            return Err(EncoderError::invalid_input("channel count outside 1..=4"));
        }
        if frame.data().len() != frame.expected_byte_len() {
            return Err(EncoderError::InvalidInput(format!(
                "pixel buffer holds {} bytes, geometry requires {}",
                frame.data().len(),
                frame.expected_byte_len()
            )));
        }
        if frame.has_alpha() != (frame.alpha_mode() != jxlenc_core::AlphaMode::None) {
            return Err(EncoderError::invalid_input("alpha flag and mode disagree"));
        }
        if frame.pixel_type() == PixelType::F32
            && matches!(
                frame.color_space().transfer(),
                TransferFunction::Pq | TransferFunction::Hlg
            )
        {
            return Err(EncoderError::unsupported(
                "float input with PQ/HLG transfer is not accepted",
            ));
        }
        Ok(())
    }
}

impl Default for JxlEncoder {
    fn default() -> Self {
        Self::new(EncodingOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxlenc_core::{AlphaMode, ColorSpace};

    fn gradient_frame(width: u32, height: u32) -> ImageFrame {
        let mut frame = ImageFrame::new(
            width,
            height,
            3,
            PixelType::U8,
            ColorSpace::Srgb,
            8,
            false,
            AlphaMode::None,
        )
        .unwrap();
        for y in 0..height {
            for x in 0..width {
                let v = ((((x + y) * 32) % 256) as u16) << 8;
                for c in 0..3 {
                    frame.set_pixel(x, y, c, v).unwrap();
                }
            }
        }
        frame
    }

    #[test]
    fn test_output_starts_with_signature() {
        for options in [
            EncodingOptions::lossless(),
            EncodingOptions::fast(),
            EncodingOptions::high_quality(),
        ] {
            let result = JxlEncoder::new(options)
                .encode(&gradient_frame(16, 16))
                .unwrap();
            assert_eq!(result.data[0], 0xFF);
            assert_eq!(result.data[1], 0x0A);
        }
    }

    #[test]
    fn test_stats_arithmetic() {
        let frame = gradient_frame(8, 8);
        let result = JxlEncoder::new(EncodingOptions::lossless())
            .encode(&frame)
            .unwrap();
        assert_eq!(result.stats.original_size, 8 * 8 * 3);
        assert!(result.stats.compressed_size > 0);
        let expected =
            result.stats.original_size as f64 / result.stats.compressed_size as f64;
        assert!((result.stats.compression_ratio - expected).abs() < 1e-12);
    }

    #[test]
    fn test_float_pq_rejected() {
        let frame = ImageFrame::new(
            4,
            4,
            3,
            PixelType::F32,
            ColorSpace::rec2020_pq(),
            16,
            false,
            AlphaMode::None,
        )
        .unwrap();
        let err = JxlEncoder::default().encode(&frame).unwrap_err();
        assert!(matches!(err, EncoderError::Unsupported(_)));
    }

    #[test]
    fn test_encoder_is_reusable() {
        let encoder = JxlEncoder::new(EncodingOptions::fast());
        let frame = gradient_frame(24, 16);
        let first = encoder.encode(&frame).unwrap();
        let second = encoder.encode(&frame).unwrap();
        assert_eq!(first.data, second.data);
    }

    #[test]
    fn test_backend_respects_options() {
        let scalar_only =
            JxlEncoder::new(EncodingOptions::lossless().use_hardware_acceleration(false));
        assert_eq!(scalar_only.backend(), DispatchBackend::Scalar);
    }
}
