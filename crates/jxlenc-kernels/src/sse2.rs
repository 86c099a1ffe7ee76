//! SSE2 backend
//!
//! SSE2 is part of the x86-64 baseline, so this backend is always
//! available there. Float kernels run four lanes at a time with scalar
//! tails; the DCT uses the separable table form, which the compiler
//! vectorizes well on this baseline.

use std::arch::x86_64::*;

use crate::{dct, Kernels};

/// The SSE2 backend
#[derive(Debug, Default, Clone, Copy)]
pub struct Sse2Ops;

impl Kernels for Sse2Ops {
    fn dct2d(&self, block: &[f32; 64], output: &mut [f32; 64]) {
        dct::dct2d_fast(block, output);
    }

    fn idct2d(&self, coefficients: &[f32; 64], output: &mut [f32; 64]) {
        dct::idct2d_fast(coefficients, output);
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
        // SSE2 is statically guaranteed on x86_64.
        unsafe { rgb_to_ycbcr_sse2(r, g, b, y, cb, cr) }
    }

    fn quantize(&self, block: &[f32; 64], q_matrix: &[f32; 64], output: &mut [i16; 64]) {
        unsafe { quantize_sse2(block, q_matrix, output) }
    }

    fn block_activity(&self, block: &[f32; 64]) -> f32 {
        unsafe { block_activity_sse2(block) }
    }
}

#[inline]
unsafe fn sum4(v: __m128) -> f32 {
    let mut lanes = [0.0f32; 4];
    _mm_storeu_ps(lanes.as_mut_ptr(), v);
    (lanes[0] + lanes[1]) + (lanes[2] + lanes[3])
}

#[target_feature(enable = "sse2")]
unsafe fn rgb_to_ycbcr_sse2(
    r: &[f32],
    g: &[f32],
    b: &[f32],
    y: &mut [f32],
    cb: &mut [f32],
    cr: &mut [f32],
) {
    let n = r.len();
    let lanes = n - n % 4;

    let yr = _mm_set1_ps(0.299);
    let yg = _mm_set1_ps(0.587);
    let yb = _mm_set1_ps(0.114);
    let cbr = _mm_set1_ps(-0.168736);
    let cbg = _mm_set1_ps(-0.331264);
    let cbb = _mm_set1_ps(0.5);
    let crr = _mm_set1_ps(0.5);
    let crg = _mm_set1_ps(-0.418688);
    let crb = _mm_set1_ps(-0.081312);
    let half = _mm_set1_ps(0.5);

    let mut i = 0;
    while i < lanes {
        let rv = _mm_loadu_ps(r.as_ptr().add(i));
        let gv = _mm_loadu_ps(g.as_ptr().add(i));
        let bv = _mm_loadu_ps(b.as_ptr().add(i));

        let yv = _mm_add_ps(
            _mm_add_ps(_mm_mul_ps(rv, yr), _mm_mul_ps(gv, yg)),
            _mm_mul_ps(bv, yb),
        );
        let cbv = _mm_add_ps(
            _mm_add_ps(
                _mm_add_ps(_mm_mul_ps(rv, cbr), _mm_mul_ps(gv, cbg)),
                _mm_mul_ps(bv, cbb),
            ),
            half,
        );
        let crv = _mm_add_ps(
            _mm_add_ps(
                _mm_add_ps(_mm_mul_ps(rv, crr), _mm_mul_ps(gv, crg)),
                _mm_mul_ps(bv, crb),
            ),
            half,
        );

        _mm_storeu_ps(y.as_mut_ptr().add(i), yv);
        _mm_storeu_ps(cb.as_mut_ptr().add(i), cbv);
        _mm_storeu_ps(cr.as_mut_ptr().add(i), crv);
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

#[target_feature(enable = "sse2")]
unsafe fn quantize_sse2(block: &[f32; 64], q_matrix: &[f32; 64], output: &mut [i16; 64]) {
    let sign_mask = _mm_set1_ps(-0.0);
    let half = _mm_set1_ps(0.5);

    for chunk in 0..8 {
        let base = chunk * 8;
        let t0 = _mm_div_ps(
            _mm_loadu_ps(block.as_ptr().add(base)),
            _mm_loadu_ps(q_matrix.as_ptr().add(base)),
        );
        let t1 = _mm_div_ps(
            _mm_loadu_ps(block.as_ptr().add(base + 4)),
            _mm_loadu_ps(q_matrix.as_ptr().add(base + 4)),
        );

        // Round half away from zero: add copysign(0.5, t), then truncate.
        let r0 = _mm_cvttps_epi32(_mm_add_ps(t0, _mm_or_ps(_mm_and_ps(t0, sign_mask), half)));
        let r1 = _mm_cvttps_epi32(_mm_add_ps(t1, _mm_or_ps(_mm_and_ps(t1, sign_mask), half)));

        let packed = _mm_packs_epi32(r0, r1);
        _mm_storeu_si128(output.as_mut_ptr().add(base) as *mut __m128i, packed);
    }
}

#[target_feature(enable = "sse2")]
unsafe fn block_activity_sse2(block: &[f32; 64]) -> f32 {
    let mut total = _mm_setzero_ps();
    for chunk in 0..16 {
        total = _mm_add_ps(total, _mm_loadu_ps(block.as_ptr().add(chunk * 4)));
    }
    let mean = _mm_set1_ps(sum4(total) / 64.0);

    let mut acc = _mm_setzero_ps();
    for chunk in 0..16 {
        let v = _mm_loadu_ps(block.as_ptr().add(chunk * 4));
        let d = _mm_sub_ps(v, mean);
        acc = _mm_add_ps(acc, _mm_mul_ps(d, d));
    }
    sum4(acc)
}
