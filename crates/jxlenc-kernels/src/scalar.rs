//! Scalar reference kernels
//!
//! These implementations define numerical truth for the conformance
//! contract: every other backend must match them within the documented
//! tolerances (exactly, for the integer kernels).

use std::f32::consts::PI;

use crate::Kernels;

/// Standard 8x8 zigzag scan order (row-major positions)
pub const ZIGZAG_8X8: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27, 20,
    13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58, 59,
    52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// The scalar backend
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarOps;

impl Kernels for ScalarOps {}

/// 8x8 forward DCT-II (direct form, the numerical reference)
pub fn dct2d(input: &[f32; 64], output: &mut [f32; 64]) {
    const N: usize = 8;
    for v in 0..N {
        for u in 0..N {
            let cu = if u == 0 { 1.0 / 2.0f32.sqrt() } else { 1.0 };
            let cv = if v == 0 { 1.0 / 2.0f32.sqrt() } else { 1.0 };
            let mut sum = 0.0;
            for y in 0..N {
                for x in 0..N {
                    sum += input[y * N + x]
                        * (((2 * x + 1) as f32 * u as f32 * PI) / (2.0 * N as f32)).cos()
                        * (((2 * y + 1) as f32 * v as f32 * PI) / (2.0 * N as f32)).cos();
                }
            }
            output[v * N + u] = sum * cu * cv * 2.0 / N as f32;
        }
    }
}

/// 8x8 inverse DCT (DCT-III, direct form)
pub fn idct2d(input: &[f32; 64], output: &mut [f32; 64]) {
    const N: usize = 8;
    for y in 0..N {
        for x in 0..N {
            let mut sum = 0.0;
            for v in 0..N {
                for u in 0..N {
                    let cu = if u == 0 { 1.0 / 2.0f32.sqrt() } else { 1.0 };
                    let cv = if v == 0 { 1.0 / 2.0f32.sqrt() } else { 1.0 };
                    sum += input[v * N + u]
                        * cu
                        * cv
                        * (((2 * x + 1) as f32 * u as f32 * PI) / (2.0 * N as f32)).cos()
                        * (((2 * y + 1) as f32 * v as f32 * PI) / (2.0 * N as f32)).cos();
                }
            }
            output[y * N + x] = sum * 2.0 / N as f32;
        }
    }
}

/// Divide by the quantization matrix, rounding half away from zero
pub fn quantize(block: &[f32; 64], q_matrix: &[f32; 64], output: &mut [i16; 64]) {
    for i in 0..64 {
        let t = block[i] / q_matrix[i];
        // f32::round ties away from zero, which is the contract here.
        output[i] = t.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
    }
}

/// Zigzag scan an 8x8 block; the DC coefficient comes first
pub fn zigzag_scan(block: &[i16; 64], output: &mut [i16; 64]) {
    for (i, &pos) in ZIGZAG_8X8.iter().enumerate() {
        output[i] = block[pos];
    }
}

/// Inverse zigzag scan, for reconstruction tests
pub fn inv_zigzag_scan(zigzag: &[i16; 64], output: &mut [i16; 64]) {
    for (i, &pos) in ZIGZAG_8X8.iter().enumerate() {
        output[pos] = zigzag[i];
    }
}

#[inline]
fn median3(a: i32, b: i32, c: i32) -> i32 {
    a.min(b).max(a.max(b).min(c))
}

#[inline]
fn med_prediction(data: &[i32], width: usize, x: usize, y: usize) -> i32 {
    let idx = y * width + x;
    if x == 0 && y == 0 {
        0
    } else if y == 0 {
        data[idx - 1]
    } else if x == 0 {
        data[idx - width]
    } else {
        let w = data[idx - 1];
        let n = data[idx - width];
        let nw = data[idx - width - 1];
        median3(w, n, w + n - nw)
    }
}

/// MED predictor residuals over a u16 raster
///
/// P = median(W, N, W + N - NW); the first pixel predicts 0, the first row
/// predicts from W, the first column from N.
pub fn predict_med(data: &[u16], width: usize, height: usize, output: &mut Vec<i32>) {
    debug_assert_eq!(data.len(), width * height);
    let widened: Vec<i32> = data.iter().map(|&v| v as i32).collect();
    predict_med_i32(&widened, width, height, output);
}

/// MED predictor residuals over an i32 plane
pub fn predict_med_i32(data: &[i32], width: usize, height: usize, output: &mut Vec<i32>) {
    debug_assert_eq!(data.len(), width * height);
    output.clear();
    output.reserve(data.len());
    for y in 0..height {
        for x in 0..width {
            let prediction = med_prediction(data, width, x, y);
            output.push(data[y * width + x] - prediction);
        }
    }
}

/// Rebuild an i32 plane from MED residuals (exact inverse of the predictor)
pub fn reconstruct_med_i32(residuals: &[i32], width: usize, height: usize) -> Vec<i32> {
    debug_assert_eq!(residuals.len(), width * height);
    let mut data = vec![0i32; residuals.len()];
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let prediction = med_prediction(&data, width, x, y);
            data[idx] = prediction + residuals[idx];
        }
    }
    data
}

/// Forward reversible color transform (YCoCg-R)
pub fn forward_rct(r: &[u16], g: &[u16], b: &[u16], y: &mut [i32], co: &mut [i32], cg: &mut [i32]) {
    debug_assert!(r.len() == g.len() && g.len() == b.len());
    for i in 0..r.len() {
        let (ri, gi, bi) = (r[i] as i32, g[i] as i32, b[i] as i32);
        let co_i = ri - bi;
        let tmp = bi + (co_i >> 1);
        let cg_i = gi - tmp;
        y[i] = tmp + (cg_i >> 1);
        co[i] = co_i;
        cg[i] = cg_i;
    }
}

/// Exact inverse of [`forward_rct`]
pub fn inverse_rct(y: &[i32], co: &[i32], cg: &[i32], r: &mut [u16], g: &mut [u16], b: &mut [u16]) {
    debug_assert!(y.len() == co.len() && co.len() == cg.len());
    for i in 0..y.len() {
        let tmp = y[i] - (cg[i] >> 1);
        let gi = cg[i] + tmp;
        let bi = tmp - (co[i] >> 1);
        let ri = bi + co[i];
        r[i] = ri as u16;
        g[i] = gi as u16;
        b[i] = bi as u16;
    }
}

/// Horizontal squeeze: averages to the left half, residuals to the right
///
/// Odd region widths carry the trailing column into the coarse half
/// unchanged. Exactly reversible via [`unsqueeze_horizontal`].
pub fn squeeze_horizontal(data: &mut [i32], width: usize, height: usize, stride: usize) {
    if width < 2 {
        return;
    }
    let pairs = width / 2;
    let coarse = width - pairs;
    let mut tmp = vec![0i32; width];
    for row in 0..height {
        let base = row * stride;
        tmp.copy_from_slice(&data[base..base + width]);
        for i in 0..pairs {
            let e = tmp[2 * i];
            let o = tmp[2 * i + 1];
            data[base + i] = (e + o) >> 1;
            data[base + coarse + i] = e - o;
        }
        if width & 1 == 1 {
            data[base + pairs] = tmp[width - 1];
        }
    }
}

/// Inverse of [`squeeze_horizontal`]
pub fn unsqueeze_horizontal(data: &mut [i32], width: usize, height: usize, stride: usize) {
    if width < 2 {
        return;
    }
    let pairs = width / 2;
    let coarse = width - pairs;
    let mut tmp = vec![0i32; width];
    for row in 0..height {
        let base = row * stride;
        tmp.copy_from_slice(&data[base..base + width]);
        for i in 0..pairs {
            let a = tmp[i];
            let d = tmp[coarse + i];
            let o = a - (d >> 1);
            let e = o + d;
            data[base + 2 * i] = e;
            data[base + 2 * i + 1] = o;
        }
        if width & 1 == 1 {
            data[base + width - 1] = tmp[pairs];
        }
    }
}

/// Vertical squeeze: the same lifting step along columns
pub fn squeeze_vertical(data: &mut [i32], width: usize, height: usize, stride: usize) {
    if height < 2 {
        return;
    }
    let pairs = height / 2;
    let coarse = height - pairs;
    let mut tmp = vec![0i32; height];
    for col in 0..width {
        for (i, t) in tmp.iter_mut().enumerate() {
            *t = data[i * stride + col];
        }
        for i in 0..pairs {
            let e = tmp[2 * i];
            let o = tmp[2 * i + 1];
            data[i * stride + col] = (e + o) >> 1;
            data[(coarse + i) * stride + col] = e - o;
        }
        if height & 1 == 1 {
            data[pairs * stride + col] = tmp[height - 1];
        }
    }
}

/// Inverse of [`squeeze_vertical`]
pub fn unsqueeze_vertical(data: &mut [i32], width: usize, height: usize, stride: usize) {
    if height < 2 {
        return;
    }
    let pairs = height / 2;
    let coarse = height - pairs;
    let mut tmp = vec![0i32; height];
    for col in 0..width {
        for (i, t) in tmp.iter_mut().enumerate() {
            *t = data[i * stride + col];
        }
        for i in 0..pairs {
            let a = tmp[i];
            let d = tmp[coarse + i];
            let o = a - (d >> 1);
            let e = o + d;
            data[(2 * i) * stride + col] = e;
            data[(2 * i + 1) * stride + col] = o;
        }
        if height & 1 == 1 {
            data[(height - 1) * stride + col] = tmp[pairs];
        }
    }
}

/// Sum of squared deviations from the block mean
pub fn block_activity(block: &[f32; 64]) -> f32 {
    let mean: f32 = block.iter().sum::<f32>() / 64.0;
    block.iter().map(|&v| (v - mean) * (v - mean)).sum()
}
