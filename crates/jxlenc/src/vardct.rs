//! VarDCT lossy coding path
//!
//! Pipeline: planarize to f32, color transform (XYB or BT.601 YCbCr),
//! tile into 8x8 blocks with mirror-extended edges, forward DCT,
//! activity-modulated quantization, zigzag scan, DC delta coding, and
//! entropy coding. Alpha, when present, is carried losslessly as MED
//! residuals after the color channels.

use jxlenc_bitstream::{pack_signed, BitstreamWriter, EntropyCoder};
use jxlenc_core::{
    consts::{BLOCK_AREA, BLOCK_SIZE},
    ColorTransform, EncoderResult, EncodingOptions, ImageFrame, MemoryMeter,
};
use jxlenc_kernels::Kernels;

use crate::progressive::{self, LOW_FREQUENCY_COEFFS, VARDCT_PASSES};

/// Base quantization steps for the luma class, JPEG-style layout
const BASE_QUANT: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69,
    56, 14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81,
    104, 113, 92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100, 103, 99,
];

/// Activity-modulation strength
const ACTIVITY_K: f32 = 0.5;

/// Working range the float channels are scaled to before the DCT
const PIXEL_SCALE: f32 = 255.0;

/// Map quality (0-100) to a perceptual distance
///
/// Piecewise linear through (100, 0.625), (95, 1.0), (75, 2.5), (50, 5.0),
/// (0, 10.0); monotone decreasing in quality and clamped at both ends.
pub fn distance_from_quality(quality: u8) -> f32 {
    let q = quality.min(100) as f32;
    let d = if q >= 95.0 {
        1.0 - (q - 95.0) * (1.0 - 0.625) / 5.0
    } else if q >= 75.0 {
        1.0 + (95.0 - q) * (2.5 - 1.0) / 20.0
    } else if q >= 50.0 {
        2.5 + (75.0 - q) * (5.0 - 2.5) / 25.0
    } else {
        5.0 + (50.0 - q) * (10.0 - 5.0) / 50.0
    };
    d.clamp(0.1, 25.0)
}

/// Base quantization matrix for a channel class at the given distance
pub fn base_quant_matrix(distance: f32, chroma: bool) -> [f32; 64] {
    let class_scale = if chroma { 2.0 } else { 1.0 };
    core::array::from_fn(|i| (BASE_QUANT[i] as f32 * distance * class_scale / 8.0).max(1.0))
}

/// Quantized coefficients of one channel, split for pass layout
struct ChannelCoefficients {
    /// Delta-coded DC, one value per block
    dc_deltas: Vec<i32>,
    /// AC coefficients in zigzag order, 63 per block
    ac: Vec<i32>,
}

/// The lossy encoder
pub struct VarDctEncoder<'a> {
    options: &'a EncodingOptions,
    kernels: &'static dyn Kernels,
}

impl<'a> VarDctEncoder<'a> {
    pub fn new(options: &'a EncodingOptions, kernels: &'static dyn Kernels) -> Self {
        Self { options, kernels }
    }

    /// Encode the frame payload (everything after the container header)
    pub fn encode(
        &self,
        frame: &ImageFrame,
        quality: u8,
        writer: &mut BitstreamWriter,
        meter: &mut MemoryMeter,
    ) -> EncoderResult<()> {
        let distance = distance_from_quality(quality);

        // Path header: distance, color transform, pass layout.
        writer.write_bits(distance.to_bits() as u64, 32)?;
        writer.write_bit(self.options.color_transform == ColorTransform::YCbCr)?;
        writer.write_bit(self.options.progressive)?;
        if self.options.progressive {
            writer.write_varint(VARDCT_PASSES as u64)?;
        }

        let channels = self.transform_color(frame, meter);
        let coded: Vec<ChannelCoefficients> = channels
            .iter()
            .map(|(plane, chroma)| {
                self.encode_channel(plane, frame.width() as usize, frame.height() as usize,
                    distance, *chroma, meter)
            })
            .collect();
        let alpha = self.alpha_residuals(frame);

        let blocks_x = (frame.width() as usize).div_ceil(BLOCK_SIZE);
        let blocks_y = (frame.height() as usize).div_ceil(BLOCK_SIZE);
        writer.write_varint(blocks_x as u64)?;
        writer.write_varint(blocks_y as u64)?;
        writer.write_varint(coded.len() as u64)?;

        let coder = EntropyCoder::new(self.options.use_ans);
        if self.options.progressive {
            self.write_progressive(&coded, alpha.as_deref(), &coder, writer)?;
        } else {
            self.write_single_pass(&coded, alpha.as_deref(), &coder, writer)?;
        }

        for (plane, _) in &channels {
            meter.release(plane.len() * std::mem::size_of::<f32>());
        }
        Ok(())
    }

    /// Planarize and color-transform the frame's color channels
    ///
    /// Returns per-channel planes with their chroma classification.
    fn transform_color(&self, frame: &ImageFrame, meter: &mut MemoryMeter) -> Vec<(Vec<f32>, bool)> {
        let n = frame.pixel_count();
        if frame.color_channels() < 3 {
            let plane = frame.planar_f32(0);
            meter.track(plane.len() * std::mem::size_of::<f32>());
            return vec![(plane, false)];
        }

        let r = frame.planar_f32(0);
        let g = frame.planar_f32(1);
        let b = frame.planar_f32(2);
        let mut c0 = vec![0.0f32; n];
        let mut c1 = vec![0.0f32; n];
        let mut c2 = vec![0.0f32; n];
        meter.track(6 * n * std::mem::size_of::<f32>());

        let channels = match self.options.color_transform {
            ColorTransform::Xyb => {
                self.kernels.rgb_to_xyb(&r, &g, &b, &mut c0, &mut c1, &mut c2);
                // Luma is the middle channel; X and B carry chroma.
                vec![(c0, true), (c1, false), (c2, true)]
            }
            ColorTransform::YCbCr => {
                self.kernels
                    .rgb_to_ycbcr(&r, &g, &b, &mut c0, &mut c1, &mut c2);
                vec![(c0, false), (c1, true), (c2, true)]
            }
        };
        // The interleaved source planes are dropped here.
        meter.release(3 * n * std::mem::size_of::<f32>());
        channels
    }

    /// DCT, quantize, and zigzag one channel
    fn encode_channel(
        &self,
        plane: &[f32],
        width: usize,
        height: usize,
        distance: f32,
        chroma: bool,
        meter: &mut MemoryMeter,
    ) -> ChannelCoefficients {
        let blocks_x = width.div_ceil(BLOCK_SIZE);
        let blocks_y = height.div_ceil(BLOCK_SIZE);
        let num_blocks = blocks_x * blocks_y;
        let base_matrix = base_quant_matrix(distance, chroma);
        let adaptive = self.options.effort.adaptive_quantization();

        meter.track(num_blocks * BLOCK_AREA * std::mem::size_of::<f32>());

        // First pass: DCT every block and measure its activity.
        let mut coefficients = vec![[0.0f32; BLOCK_AREA]; num_blocks];
        let mut activities = vec![0.0f32; num_blocks];
        let mut block = [0.0f32; BLOCK_AREA];
        for by in 0..blocks_y {
            for bx in 0..blocks_x {
                extract_block(plane, width, height, bx, by, &mut block);
                let idx = by * blocks_x + bx;
                activities[idx] = self.kernels.block_activity(&block);
                self.kernels.dct2d(&block, &mut coefficients[idx]);
            }
        }
        let activity_mean = activities.iter().sum::<f32>() / num_blocks as f32;

        // Second pass: quantize with the per-block multiplier and scan.
        let mut dc_deltas = Vec::with_capacity(num_blocks);
        let mut ac = Vec::with_capacity(num_blocks * (BLOCK_AREA - 1));
        let mut q_matrix = [0.0f32; BLOCK_AREA];
        let mut quantized = [0i16; BLOCK_AREA];
        let mut zigzag = [0i16; BLOCK_AREA];
        let mut previous_dc = 0i32;
        for (idx, coeffs) in coefficients.iter().enumerate() {
            let multiplier = if adaptive && activity_mean > 0.0 {
                (1.0 + ACTIVITY_K * (activities[idx] - activity_mean) / activity_mean)
                    .clamp(0.5, 2.0)
            } else {
                1.0
            };
            for (q, &base) in q_matrix.iter_mut().zip(base_matrix.iter()) {
                *q = base * multiplier;
            }
            self.kernels.quantize(coeffs, &q_matrix, &mut quantized);
            self.kernels.zigzag_scan(&quantized, &mut zigzag);

            let dc = zigzag[0] as i32;
            dc_deltas.push(dc - previous_dc);
            previous_dc = dc;
            ac.extend(zigzag[1..].iter().map(|&v| v as i32));
        }

        meter.release(num_blocks * BLOCK_AREA * std::mem::size_of::<f32>());
        ChannelCoefficients { dc_deltas, ac }
    }

    /// Lossless MED residuals for the alpha channel, if present
    fn alpha_residuals(&self, frame: &ImageFrame) -> Option<Vec<i32>> {
        if !frame.has_alpha() {
            return None;
        }
        let alpha = frame.planar_u16(frame.channels() - 1);
        let mut residuals = Vec::new();
        self.kernels.predict_med(
            &alpha,
            frame.width() as usize,
            frame.height() as usize,
            &mut residuals,
        );
        Some(residuals)
    }

    fn write_single_pass(
        &self,
        coded: &[ChannelCoefficients],
        alpha: Option<&[i32]>,
        coder: &EntropyCoder,
        writer: &mut BitstreamWriter,
    ) -> EncoderResult<()> {
        for channel in coded {
            encode_signed(coder, &channel.dc_deltas, writer)?;
            encode_signed(coder, &channel.ac, writer)?;
        }
        if let Some(residuals) = alpha {
            encode_signed(coder, residuals, writer)?;
        }
        Ok(())
    }

    /// Pass 1: DC (+ alpha); pass 2: low-frequency AC; pass 3: the rest
    fn write_progressive(
        &self,
        coded: &[ChannelCoefficients],
        alpha: Option<&[i32]>,
        coder: &EntropyCoder,
        writer: &mut BitstreamWriter,
    ) -> EncoderResult<()> {
        let split = LOW_FREQUENCY_COEFFS - 1; // AC slots per block in pass 2

        let mut dc_pass = BitstreamWriter::new();
        for channel in coded {
            encode_signed(coder, &channel.dc_deltas, &mut dc_pass)?;
        }
        if let Some(residuals) = alpha {
            encode_signed(coder, residuals, &mut dc_pass)?;
        }
        progressive::write_pass(writer, 0, &dc_pass.into_bytes())?;

        let mut low_pass = BitstreamWriter::new();
        for channel in coded {
            let low = select_ac(&channel.ac, 0, split);
            encode_signed(coder, &low, &mut low_pass)?;
        }
        progressive::write_pass(writer, 1, &low_pass.into_bytes())?;

        let mut high_pass = BitstreamWriter::new();
        for channel in coded {
            let high = select_ac(&channel.ac, split, BLOCK_AREA - 1);
            encode_signed(coder, &high, &mut high_pass)?;
        }
        progressive::write_pass(writer, 2, &high_pass.into_bytes())?;
        Ok(())
    }
}

/// Gather the zigzag AC slots `[from, to)` of every block
fn select_ac(ac: &[i32], from: usize, to: usize) -> Vec<i32> {
    const PER_BLOCK: usize = BLOCK_AREA - 1;
    let mut out = Vec::with_capacity(ac.len() / PER_BLOCK * (to - from));
    for block in ac.chunks_exact(PER_BLOCK) {
        out.extend_from_slice(&block[from..to]);
    }
    out
}

fn encode_signed(
    coder: &EntropyCoder,
    values: &[i32],
    writer: &mut BitstreamWriter,
) -> EncoderResult<()> {
    let packed: Vec<u32> = values.iter().map(|&v| pack_signed(v)).collect();
    coder.encode_stream(&packed, writer)
}

/// Copy an 8x8 block, mirror-extending past the right/bottom edges
fn extract_block(
    plane: &[f32],
    width: usize,
    height: usize,
    bx: usize,
    by: usize,
    block: &mut [f32; BLOCK_AREA],
) {
    for y in 0..BLOCK_SIZE {
        let sy = mirror_index(by * BLOCK_SIZE + y, height);
        for x in 0..BLOCK_SIZE {
            let sx = mirror_index(bx * BLOCK_SIZE + x, width);
            block[y * BLOCK_SIZE + x] = plane[sy * width + sx] * PIXEL_SCALE;
        }
    }
}

/// Reflect an index into `[0, len)` without repeating the edge sample's
/// neighbor pattern more than necessary
fn mirror_index(index: usize, len: usize) -> usize {
    let mut i = index as isize;
    let n = len as isize;
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - 1 - i;
        } else {
            return i as usize;
        }
    }
}
