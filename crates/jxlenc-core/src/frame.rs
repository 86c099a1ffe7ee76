//! Image frame container

use crate::{
    consts::{MAX_CHANNELS, MAX_IMAGE_DIMENSION},
    AlphaMode, ColorSpace, EncoderError, EncoderResult, PixelType,
};

/// A raw pixel buffer prepared for encoding
///
/// Samples are stored interleaved in a flat byte buffer of exactly
/// `width * height * channels * bytes_per_sample` bytes. Pixel access goes
/// through a 16-bit window regardless of the storage type; float samples
/// are scaled through that window with bounded error.
#[derive(Debug, Clone)]
pub struct ImageFrame {
    width: u32,
    height: u32,
    channels: usize,
    pixel_type: PixelType,
    bits_per_sample: u8,
    color_space: ColorSpace,
    has_alpha: bool,
    alpha_mode: AlphaMode,
    data: Vec<u8>,
}

impl ImageFrame {
    /// Create a zero-filled frame, validating the field invariants
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: u32,
        height: u32,
        channels: usize,
        pixel_type: PixelType,
        color_space: ColorSpace,
        bits_per_sample: u8,
        has_alpha: bool,
        alpha_mode: AlphaMode,
    ) -> EncoderResult<Self> {
        if width == 0 || height == 0 {
            return Err(EncoderError::InvalidInput(format!(
                "invalid dimensions: {}x{}",
                width, height
            )));
        }
        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(EncoderError::InvalidInput(format!(
                "dimensions {}x{} exceed the {} limit",
                width, height, MAX_IMAGE_DIMENSION
            )));
        }
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(EncoderError::InvalidInput(format!(
                "channel count {} outside 1..=4",
                channels
            )));
        }
        if has_alpha != (alpha_mode != AlphaMode::None) {
            return Err(EncoderError::invalid_input(
                "alpha mode must be none exactly when the frame has no alpha",
            ));
        }
        let channel_range = if color_space.is_grayscale() {
            1..=2
        } else {
            3..=4
        };
        if !channel_range.contains(&channels) {
            return Err(EncoderError::InvalidInput(format!(
                "{} channels inconsistent with {:?}",
                channels, color_space
            )));
        }
        if bits_per_sample == 0 || bits_per_sample > pixel_type.storage_bits() {
            return Err(EncoderError::InvalidInput(format!(
                "bit depth {} does not fit {:?} storage",
                bits_per_sample, pixel_type
            )));
        }

        let len = width as usize * height as usize * channels * pixel_type.bytes_per_sample();
        Ok(Self {
            width,
            height,
            channels,
            pixel_type,
            bits_per_sample,
            color_space,
            has_alpha,
            alpha_mode,
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub fn bits_per_sample(&self) -> u8 {
        self.bits_per_sample
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of color channels, excluding alpha
    pub fn color_channels(&self) -> usize {
        if self.has_alpha {
            self.channels - 1
        } else {
            self.channels
        }
    }

    /// The raw interleaved sample bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Byte length the buffer must have for the frame's geometry
    pub fn expected_byte_len(&self) -> usize {
        self.pixel_count() * self.channels * self.pixel_type.bytes_per_sample()
    }

    fn sample_index(&self, x: u32, y: u32, channel: usize) -> EncoderResult<usize> {
        if x >= self.width || y >= self.height || channel >= self.channels {
            return Err(EncoderError::InvalidInput(format!(
                "pixel access ({}, {}, {}) out of range",
                x, y, channel
            )));
        }
        Ok((y as usize * self.width as usize + x as usize) * self.channels + channel)
    }

    /// Read a sample through the 16-bit window
    pub fn get_pixel(&self, x: u32, y: u32, channel: usize) -> EncoderResult<u16> {
        let idx = self.sample_index(x, y, channel)?;
        Ok(match self.pixel_type {
            PixelType::U8 => self.data[idx] as u16 * 257,
            PixelType::U16 => u16::from_le_bytes([self.data[idx * 2], self.data[idx * 2 + 1]]),
            PixelType::F32 => {
                let bytes = [
                    self.data[idx * 4],
                    self.data[idx * 4 + 1],
                    self.data[idx * 4 + 2],
                    self.data[idx * 4 + 3],
                ];
                let v = f32::from_le_bytes(bytes);
                (v.clamp(0.0, 1.0) * 65535.0).round() as u16
            }
        })
    }

    /// Write a sample through the 16-bit window
    pub fn set_pixel(&mut self, x: u32, y: u32, channel: usize, value: u16) -> EncoderResult<()> {
        let idx = self.sample_index(x, y, channel)?;
        match self.pixel_type {
            PixelType::U8 => self.data[idx] = (value >> 8) as u8,
            PixelType::U16 => {
                self.data[idx * 2..idx * 2 + 2].copy_from_slice(&value.to_le_bytes());
            }
            PixelType::F32 => {
                let v = value as f32 / 65535.0;
                self.data[idx * 4..idx * 4 + 4].copy_from_slice(&v.to_le_bytes());
            }
        }
        Ok(())
    }

    /// Extract one channel as normalized f32 in [0, 1]
    pub fn planar_f32(&self, channel: usize) -> Vec<f32> {
        let n = self.pixel_count();
        let c = self.channels;
        let mut out = Vec::with_capacity(n);
        match self.pixel_type {
            PixelType::U8 => {
                for i in 0..n {
                    out.push(self.data[i * c + channel] as f32 / 255.0);
                }
            }
            PixelType::U16 => {
                for i in 0..n {
                    let idx = (i * c + channel) * 2;
                    let v = u16::from_le_bytes([self.data[idx], self.data[idx + 1]]);
                    out.push(v as f32 / 65535.0);
                }
            }
            PixelType::F32 => {
                for i in 0..n {
                    let idx = (i * c + channel) * 4;
                    let bytes = [
                        self.data[idx],
                        self.data[idx + 1],
                        self.data[idx + 2],
                        self.data[idx + 3],
                    ];
                    out.push(f32::from_le_bytes(bytes));
                }
            }
        }
        out
    }

    /// Extract one channel at its native integer depth
    ///
    /// Float samples are scaled to the frame's effective bit depth; for
    /// integer storage the stored values are returned unchanged, so the
    /// lossless path sees exactly what the caller wrote.
    pub fn planar_i32(&self, channel: usize) -> Vec<i32> {
        let n = self.pixel_count();
        let c = self.channels;
        let mut out = Vec::with_capacity(n);
        match self.pixel_type {
            PixelType::U8 => {
                for i in 0..n {
                    out.push(self.data[i * c + channel] as i32);
                }
            }
            PixelType::U16 => {
                for i in 0..n {
                    let idx = (i * c + channel) * 2;
                    out.push(u16::from_le_bytes([self.data[idx], self.data[idx + 1]]) as i32);
                }
            }
            PixelType::F32 => {
                let max = ((1u64 << self.bits_per_sample) - 1) as f32;
                for i in 0..n {
                    let idx = (i * c + channel) * 4;
                    let bytes = [
                        self.data[idx],
                        self.data[idx + 1],
                        self.data[idx + 2],
                        self.data[idx + 3],
                    ];
                    let v = f32::from_le_bytes(bytes);
                    out.push((v.clamp(0.0, 1.0) * max).round() as i32);
                }
            }
        }
        out
    }

    /// Extract one channel widened to u16
    pub fn planar_u16(&self, channel: usize) -> Vec<u16> {
        self.planar_i32(channel)
            .into_iter()
            .map(|v| v.clamp(0, u16::MAX as i32) as u16)
            .collect()
    }
}
