//! Modular lossless coding path
//!
//! Pipeline: widen channels to i32 at the frame's native depth, apply the
//! reversible color transform to RGB, run the squeeze schedule chosen by
//! the effort tier, take MED residuals per channel, and entropy-code the
//! sign-packed residuals. Every step is exactly invertible; the decode
//! half lives in [`crate::decode`] for round-trip validation.

use jxlenc_bitstream::{pack_signed, BitstreamWriter, EntropyCoder};
use jxlenc_core::{EncoderResult, EncodingOptions, ImageFrame, MemoryMeter};
use jxlenc_kernels::{scalar, Kernels};

use crate::progressive::{self, MODULAR_PASSES};

/// One squeeze step: horizontal then vertical over the current coarse
/// region, which shrinks to the ceil-half in each dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqueezeSchedule {
    pub levels: u8,
}

impl SqueezeSchedule {
    /// Clamp the effort's squeeze level count to what the image can hold
    pub fn for_image(requested: u8, width: usize, height: usize) -> Self {
        let mut levels = 0u8;
        let (mut w, mut h) = (width, height);
        while levels < requested && w >= 2 && h >= 2 {
            w = w.div_ceil(2);
            h = h.div_ceil(2);
            levels += 1;
        }
        Self { levels }
    }

    /// Coarse-region size after all levels
    pub fn coarse_size(&self, width: usize, height: usize) -> (usize, usize) {
        let (mut w, mut h) = (width, height);
        for _ in 0..self.levels {
            w = w.div_ceil(2);
            h = h.div_ceil(2);
        }
        (w, h)
    }
}

/// Apply the squeeze schedule in place
pub fn apply_squeeze(
    kernels: &dyn Kernels,
    plane: &mut [i32],
    width: usize,
    height: usize,
    schedule: SqueezeSchedule,
) {
    let (mut w, mut h) = (width, height);
    for _ in 0..schedule.levels {
        kernels.squeeze_horizontal(plane, w, h, width);
        w = w.div_ceil(2);
        kernels.squeeze_vertical(plane, w, h, width);
        h = h.div_ceil(2);
    }
}

/// Exact inverse of [`apply_squeeze`]
pub fn undo_squeeze(plane: &mut [i32], width: usize, height: usize, schedule: SqueezeSchedule) {
    // Rebuild the region sizes of each level, then undo in reverse order.
    let mut sizes = Vec::with_capacity(schedule.levels as usize);
    let (mut w, mut h) = (width, height);
    for _ in 0..schedule.levels {
        sizes.push((w, h));
        w = w.div_ceil(2);
        h = h.div_ceil(2);
    }
    for &(w, h) in sizes.iter().rev() {
        scalar::unsqueeze_vertical(plane, w.div_ceil(2), h, width);
        scalar::unsqueeze_horizontal(plane, w, h, width);
    }
}

/// The lossless encoder
pub struct ModularEncoder<'a> {
    options: &'a EncodingOptions,
    kernels: &'static dyn Kernels,
}

impl<'a> ModularEncoder<'a> {
    pub fn new(options: &'a EncodingOptions, kernels: &'static dyn Kernels) -> Self {
        Self { options, kernels }
    }

    /// Encode the frame payload (everything after the container header)
    pub fn encode(
        &self,
        frame: &ImageFrame,
        writer: &mut BitstreamWriter,
        meter: &mut MemoryMeter,
    ) -> EncoderResult<()> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let schedule = SqueezeSchedule::for_image(
            self.options.effort.squeeze_levels(),
            width,
            height,
        );
        let use_rct = frame.color_channels() >= 3;

        // Path header: transforms applied and pass layout.
        writer.write_varint(schedule.levels as u64)?;
        writer.write_bit(use_rct)?;
        writer.write_bit(self.options.progressive)?;
        if self.options.progressive {
            writer.write_varint(MODULAR_PASSES as u64)?;
        }

        let residual_planes = self.transform(frame, schedule, meter)?;

        let coder = EntropyCoder::new(self.options.use_ans);
        if self.options.progressive {
            self.write_progressive(&residual_planes, width, height, schedule, &coder, writer)?;
        } else {
            for residuals in &residual_planes {
                encode_signed(&coder, residuals, writer)?;
            }
        }

        for plane in &residual_planes {
            meter.release(plane.len() * std::mem::size_of::<i32>());
        }
        Ok(())
    }

    /// RCT + squeeze + MED over every channel
    fn transform(
        &self,
        frame: &ImageFrame,
        schedule: SqueezeSchedule,
        meter: &mut MemoryMeter,
    ) -> EncoderResult<Vec<Vec<i32>>> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let n = frame.pixel_count();

        let mut planes: Vec<Vec<i32>> = (0..frame.channels())
            .map(|c| frame.planar_i32(c))
            .collect();
        meter.track(frame.channels() * n * std::mem::size_of::<i32>() * 2);

        if frame.color_channels() >= 3 {
            let r: Vec<u16> = planes[0].iter().map(|&v| v as u16).collect();
            let g: Vec<u16> = planes[1].iter().map(|&v| v as u16).collect();
            let b: Vec<u16> = planes[2].iter().map(|&v| v as u16).collect();
            let (mut y, mut co, mut cg) = (vec![0i32; n], vec![0i32; n], vec![0i32; n]);
            self.kernels.forward_rct(&r, &g, &b, &mut y, &mut co, &mut cg);
            planes[0] = y;
            planes[1] = co;
            planes[2] = cg;
        }

        let mut residual_planes = Vec::with_capacity(planes.len());
        for plane in planes.iter_mut() {
            apply_squeeze(self.kernels, plane, width, height, schedule);
            let mut residuals = Vec::new();
            scalar::predict_med_i32(plane, width, height, &mut residuals);
            residual_planes.push(residuals);
        }
        meter.release(frame.channels() * n * std::mem::size_of::<i32>());
        Ok(residual_planes)
    }

    /// Pass 1: residuals inside the post-squeeze coarse region; pass 2:
    /// everything else
    fn write_progressive(
        &self,
        residual_planes: &[Vec<i32>],
        width: usize,
        height: usize,
        schedule: SqueezeSchedule,
        coder: &EntropyCoder,
        writer: &mut BitstreamWriter,
    ) -> EncoderResult<()> {
        let (coarse_w, coarse_h) = schedule.coarse_size(width, height);

        let mut coarse_pass = BitstreamWriter::new();
        for residuals in residual_planes {
            let coarse = select_region(residuals, width, coarse_w, coarse_h, true);
            encode_signed(coder, &coarse, &mut coarse_pass)?;
        }
        progressive::write_pass(writer, 0, &coarse_pass.into_bytes())?;

        let mut detail_pass = BitstreamWriter::new();
        for residuals in residual_planes {
            let detail = select_region(residuals, width, coarse_w, coarse_h, false);
            encode_signed(coder, &detail, &mut detail_pass)?;
        }
        progressive::write_pass(writer, 1, &detail_pass.into_bytes())?;
        Ok(())
    }
}

/// Split a raster into the coarse top-left rectangle and the remainder
pub fn select_region(
    plane: &[i32],
    width: usize,
    coarse_w: usize,
    coarse_h: usize,
    inside: bool,
) -> Vec<i32> {
    let mut out = Vec::new();
    for (idx, &value) in plane.iter().enumerate() {
        let (x, y) = (idx % width, idx / width);
        if (x < coarse_w && y < coarse_h) == inside {
            out.push(value);
        }
    }
    out
}

/// Reassemble a raster from its coarse and detail partitions
pub fn merge_regions(
    coarse: &[i32],
    detail: &[i32],
    width: usize,
    height: usize,
    coarse_w: usize,
    coarse_h: usize,
) -> Vec<i32> {
    let mut out = vec![0i32; width * height];
    let (mut ci, mut di) = (0usize, 0usize);
    for (idx, slot) in out.iter_mut().enumerate() {
        let (x, y) = (idx % width, idx / width);
        if x < coarse_w && y < coarse_h {
            *slot = coarse[ci];
            ci += 1;
        } else {
            *slot = detail[di];
            di += 1;
        }
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
