//! NEON backend (aarch64)
//!
//! NEON is architecturally guaranteed on aarch64. Quantization uses the
//! native round-ties-away conversion, so it is bit-exact against the
//! scalar reference by construction.

use std::arch::aarch64::*;

use crate::{dct, Kernels};

/// The NEON backend
#[derive(Debug, Default, Clone, Copy)]
pub struct NeonOps;

impl Kernels for NeonOps {
    fn dct2d(&self, block: &[f32; 64], output: &mut [f32; 64]) {
        // NEON is always present on aarch64.
        unsafe { dct2d_neon(block, output) }
    }

    fn idct2d(&self, coefficients: &[f32; 64], output: &mut [f32; 64]) {
        unsafe { idct2d_neon(coefficients, output) }
    }

    fn rgb_to_ycbcr(
        &self,
        r: &[f32],
        g: &[f32],
        b: &[f32],
        y: &mut [f32],
        cb: &mut [f32],
        cr: &mut [f32],
    ) {
        unsafe { rgb_to_ycbcr_neon(r, g, b, y, cb, cr) }
    }

    fn quantize(&self, block: &[f32; 64], q_matrix: &[f32; 64], output: &mut [i16; 64]) {
        unsafe { quantize_neon(block, q_matrix, output) }
    }

    fn block_activity(&self, block: &[f32; 64]) -> f32 {
        unsafe { block_activity_neon(block) }
    }
}

#[target_feature(enable = "neon")]
unsafe fn dct2d_neon(block: &[f32; 64], output: &mut [f32; 64]) {
    dct::dct2d_fast(block, output);
}

#[target_feature(enable = "neon")]
unsafe fn idct2d_neon(coefficients: &[f32; 64], output: &mut [f32; 64]) {
    dct::idct2d_fast(coefficients, output);
}

#[target_feature(enable = "neon")]
unsafe fn rgb_to_ycbcr_neon(
    r: &[f32],
    g: &[f32],
    b: &[f32],
    y: &mut [f32],
    cb: &mut [f32],
    cr: &mut [f32],
) {
    let n = r.len();
    let lanes = n - n % 4;
    let half = vdupq_n_f32(0.5);

    let mut i = 0;
    while i < lanes {
        let rv = vld1q_f32(r.as_ptr().add(i));
        let gv = vld1q_f32(g.as_ptr().add(i));
        let bv = vld1q_f32(b.as_ptr().add(i));

        let yv = vfmaq_n_f32(vfmaq_n_f32(vmulq_n_f32(rv, 0.299), gv, 0.587), bv, 0.114);
        let cbv = vfmaq_n_f32(
            vfmaq_n_f32(vfmaq_n_f32(half, rv, -0.168736), gv, -0.331264),
            bv,
            0.5,
        );
        let crv = vfmaq_n_f32(
            vfmaq_n_f32(vfmaq_n_f32(half, rv, 0.5), gv, -0.418688),
            bv,
            -0.081312,
        );

        vst1q_f32(y.as_mut_ptr().add(i), yv);
        vst1q_f32(cb.as_mut_ptr().add(i), cbv);
        vst1q_f32(cr.as_mut_ptr().add(i), crv);
        i += 4;
    }

    // Scalar tail keeps the output length exact; no padding.
    for i in lanes..n {
        let (yy, cbb, crr) = jxlenc_color::rgb_to_ycbcr(r[i], g[i], b[i]);
        y[i] = yy;
        cb[i] = cbb;
        cr[i] = crr;
    }
}

#[target_feature(enable = "neon")]
unsafe fn quantize_neon(block: &[f32; 64], q_matrix: &[f32; 64], output: &mut [i16; 64]) {
    for chunk in 0..8 {
        let base = chunk * 8;
        let t0 = vdivq_f32(
            vld1q_f32(block.as_ptr().add(base)),
            vld1q_f32(q_matrix.as_ptr().add(base)),
        );
        let t1 = vdivq_f32(
            vld1q_f32(block.as_ptr().add(base + 4)),
            vld1q_f32(q_matrix.as_ptr().add(base + 4)),
        );

        // vcvtaq rounds to nearest, ties away from zero.
        let r0 = vcvtaq_s32_f32(t0);
        let r1 = vcvtaq_s32_f32(t1);
        let packed = vcombine_s16(vqmovn_s32(r0), vqmovn_s32(r1));
        vst1q_s16(output.as_mut_ptr().add(base), packed);
    }
}

#[target_feature(enable = "neon")]
unsafe fn block_activity_neon(block: &[f32; 64]) -> f32 {
    let mut total = vdupq_n_f32(0.0);
    for chunk in 0..16 {
        total = vaddq_f32(total, vld1q_f32(block.as_ptr().add(chunk * 4)));
    }
    let mean = vdupq_n_f32(vaddvq_f32(total) / 64.0);

    let mut acc = vdupq_n_f32(0.0);
    for chunk in 0..16 {
        let v = vld1q_f32(block.as_ptr().add(chunk * 4));
        let d = vsubq_f32(v, mean);
        acc = vfmaq_f32(acc, d, d);
    }
    vaddvq_f32(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{self, ScalarOps};

    #[test]
    fn test_ycbcr_matches_scalar_with_tail() {
        let r: Vec<f32> = (0..13).map(|i| i as f32 / 12.0).collect();
        let g: Vec<f32> = (0..13).map(|i| (12 - i) as f32 / 12.0).collect();
        let b: Vec<f32> = (0..13).map(|i| (i % 3) as f32 / 2.0).collect();

        let n = r.len();
        let (mut y1, mut cb1, mut cr1) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        let (mut y2, mut cb2, mut cr2) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);

        ScalarOps.rgb_to_ycbcr(&r, &g, &b, &mut y1, &mut cb1, &mut cr1);
        NeonOps.rgb_to_ycbcr(&r, &g, &b, &mut y2, &mut cb2, &mut cr2);

        for i in 0..n {
            assert!((y1[i] - y2[i]).abs() < 1e-5);
            assert!((cb1[i] - cb2[i]).abs() < 1e-5);
            assert!((cr1[i] - cr2[i]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_quantize_matches_scalar_exactly() {
        let block: [f32; 64] = core::array::from_fn(|i| (i as f32 - 31.5) * 0.73);
        let q: [f32; 64] = core::array::from_fn(|i| 1.0 + (i % 9) as f32 * 0.5);
        let mut expected = [0i16; 64];
        let mut got = [0i16; 64];
        scalar::quantize(&block, &q, &mut expected);
        NeonOps.quantize(&block, &q, &mut got);
        assert_eq!(expected, got);
    }

    #[test]
    fn test_activity_matches_scalar() {
        let block: [f32; 64] = core::array::from_fn(|i| ((i * 17) % 41) as f32 / 41.0);
        let expected = scalar::block_activity(&block);
        let got = NeonOps.block_activity(&block);
        assert!((expected - got).abs() < 1e-4);
    }
}
