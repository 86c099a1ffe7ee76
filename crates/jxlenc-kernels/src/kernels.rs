//! The kernel surface shared by all backends
//!
//! Default methods delegate to the scalar reference implementations;
//! backends override the floating-point kernels where their instruction
//! set helps. Exact-integer kernels (quantize rounding aside, these are
//! pure integer arithmetic) stay on the shared code so every backend is
//! bit-identical on them by construction.

use crate::scalar;

/// Backend-polymorphic kernel surface
///
/// Implementations are stateless and therefore safe to call from any
/// thread. Kernels never fail: they are total over their typed inputs.
pub trait Kernels: Send + Sync {
    /// 8x8 forward DCT-II, BT-normalized
    fn dct2d(&self, block: &[f32; 64], output: &mut [f32; 64]) {
        scalar::dct2d(block, output);
    }

    /// 8x8 inverse DCT (DCT-III)
    fn idct2d(&self, coefficients: &[f32; 64], output: &mut [f32; 64]) {
        scalar::idct2d(coefficients, output);
    }

    /// BT.601 full-range RGB to YCbCr over planar buffers of equal length
    fn rgb_to_ycbcr(
        &self,
        r: &[f32],
        g: &[f32],
        b: &[f32],
        y: &mut [f32],
        cb: &mut [f32],
        cr: &mut [f32],
    ) {
        jxlenc_color::rgb_planes_to_ycbcr(r, g, b, y, cb, cr);
    }

    /// Opsin transform, linear RGB to XYB
    fn rgb_to_xyb(
        &self,
        r: &[f32],
        g: &[f32],
        b: &[f32],
        x: &mut [f32],
        y: &mut [f32],
        bch: &mut [f32],
    ) {
        jxlenc_color::rgb_planes_to_xyb(r, g, b, x, y, bch);
    }

    /// Inverse opsin transform, XYB to linear RGB
    fn xyb_to_rgb(
        &self,
        x: &[f32],
        y: &[f32],
        bch: &[f32],
        r: &mut [f32],
        g: &mut [f32],
        b: &mut [f32],
    ) {
        jxlenc_color::xyb_planes_to_rgb(x, y, bch, r, g, b);
    }

    /// Divide by the quantization matrix and round half away from zero
    fn quantize(&self, block: &[f32; 64], q_matrix: &[f32; 64], output: &mut [i16; 64]) {
        scalar::quantize(block, q_matrix, output);
    }

    /// Standard JPEG zigzag scan; output[0] is the DC coefficient
    fn zigzag_scan(&self, block: &[i16; 64], output: &mut [i16; 64]) {
        scalar::zigzag_scan(block, output);
    }

    /// Median edge detector residuals over a u16 raster
    fn predict_med(&self, data: &[u16], width: usize, height: usize, output: &mut Vec<i32>) {
        scalar::predict_med(data, width, height, output);
    }

    /// Reversible color transform (YCoCg-R)
    fn forward_rct(
        &self,
        r: &[u16],
        g: &[u16],
        b: &[u16],
        y: &mut [i32],
        co: &mut [i32],
        cg: &mut [i32],
    ) {
        scalar::forward_rct(r, g, b, y, co, cg);
    }

    /// Exact inverse of [`Kernels::forward_rct`]
    fn inverse_rct(
        &self,
        y: &[i32],
        co: &[i32],
        cg: &[i32],
        r: &mut [u16],
        g: &mut [u16],
        b: &mut [u16],
    ) {
        scalar::inverse_rct(y, co, cg, r, g, b);
    }

    /// In-place horizontal squeeze of a (width x height) region
    fn squeeze_horizontal(&self, data: &mut [i32], width: usize, height: usize, stride: usize) {
        scalar::squeeze_horizontal(data, width, height, stride);
    }

    /// In-place vertical squeeze of a (width x height) region
    fn squeeze_vertical(&self, data: &mut [i32], width: usize, height: usize, stride: usize) {
        scalar::squeeze_vertical(data, width, height, stride);
    }

    /// Sum of squared deviations from the block mean; 0 for constant blocks
    fn block_activity(&self, block: &[f32; 64]) -> f32 {
        scalar::block_activity(block)
    }
}
