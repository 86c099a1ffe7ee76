//! AVX2 backend
//!
//! Selected only when runtime detection confirms AVX2. Float kernels run
//! eight lanes at a time; the DCT reuses the separable table form inside
//! an AVX2-enabled function so the compiler can widen the inner loops.

use std::arch::x86_64::*;

use crate::{dct, Kernels};

/// The AVX2 backend
#[derive(Debug, Default, Clone, Copy)]
pub struct Avx2Ops;

impl Kernels for Avx2Ops {
    fn dct2d(&self, block: &[f32; 64], output: &mut [f32; 64]) {
        // Callers only reach this backend after feature detection.
        unsafe { dct2d_avx2(block, output) }
    }

    fn idct2d(&self, coefficients: &[f32; 64], output: &mut [f32; 64]) {
        unsafe { idct2d_avx2(coefficients, output) }
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
        unsafe { rgb_to_ycbcr_avx2(r, g, b, y, cb, cr) }
    }

    fn quantize(&self, block: &[f32; 64], q_matrix: &[f32; 64], output: &mut [i16; 64]) {
        unsafe { quantize_avx2(block, q_matrix, output) }
    }

    fn block_activity(&self, block: &[f32; 64]) -> f32 {
        unsafe { block_activity_avx2(block) }
    }
}

#[target_feature(enable = "avx2")]
unsafe fn dct2d_avx2(block: &[f32; 64], output: &mut [f32; 64]) {
    dct::dct2d_fast(block, output);
}

#[target_feature(enable = "avx2")]
unsafe fn idct2d_avx2(coefficients: &[f32; 64], output: &mut [f32; 64]) {
    dct::idct2d_fast(coefficients, output);
}

#[inline]
unsafe fn sum8(v: __m256) -> f32 {
    let mut lanes = [0.0f32; 8];
    _mm256_storeu_ps(lanes.as_mut_ptr(), v);
    ((lanes[0] + lanes[1]) + (lanes[2] + lanes[3]))
        + ((lanes[4] + lanes[5]) + (lanes[6] + lanes[7]))
}

#[target_feature(enable = "avx2")]
unsafe fn rgb_to_ycbcr_avx2(
    r: &[f32],
    g: &[f32],
    b: &[f32],
    y: &mut [f32],
    cb: &mut [f32],
    cr: &mut [f32],
) {
    let n = r.len();
    let lanes = n - n % 8;

    let yr = _mm256_set1_ps(0.299);
    let yg = _mm256_set1_ps(0.587);
    let yb = _mm256_set1_ps(0.114);
    let cbr = _mm256_set1_ps(-0.168736);
    let cbg = _mm256_set1_ps(-0.331264);
    let cbb = _mm256_set1_ps(0.5);
    let crr = _mm256_set1_ps(0.5);
    let crg = _mm256_set1_ps(-0.418688);
    let crb = _mm256_set1_ps(-0.081312);
    let half = _mm256_set1_ps(0.5);

    let mut i = 0;
    while i < lanes {
        let rv = _mm256_loadu_ps(r.as_ptr().add(i));
        let gv = _mm256_loadu_ps(g.as_ptr().add(i));
        let bv = _mm256_loadu_ps(b.as_ptr().add(i));

        let yv = _mm256_add_ps(
            _mm256_add_ps(_mm256_mul_ps(rv, yr), _mm256_mul_ps(gv, yg)),
            _mm256_mul_ps(bv, yb),
        );
        let cbv = _mm256_add_ps(
            _mm256_add_ps(
                _mm256_add_ps(_mm256_mul_ps(rv, cbr), _mm256_mul_ps(gv, cbg)),
                _mm256_mul_ps(bv, cbb),
            ),
            half,
        );
        let crv = _mm256_add_ps(
            _mm256_add_ps(
                _mm256_add_ps(_mm256_mul_ps(rv, crr), _mm256_mul_ps(gv, crg)),
                _mm256_mul_ps(bv, crb),
            ),
            half,
        );

        _mm256_storeu_ps(y.as_mut_ptr().add(i), yv);
        _mm256_storeu_ps(cb.as_mut_ptr().add(i), cbv);
        _mm256_storeu_ps(cr.as_mut_ptr().add(i), crv);
        i += 8;
    }

    for i in lanes..n {
        let (yy, cbb, crr) = jxlenc_color::rgb_to_ycbcr(r[i], g[i], b[i]);
        y[i] = yy;
        cb[i] = cbb;
        cr[i] = crr;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn quantize_avx2(block: &[f32; 64], q_matrix: &[f32; 64], output: &mut [i16; 64]) {
    let sign_mask = _mm256_set1_ps(-0.0);
    let half = _mm256_set1_ps(0.5);

    for chunk in 0..8 {
        let base = chunk * 8;
        let t = _mm256_div_ps(
            _mm256_loadu_ps(block.as_ptr().add(base)),
            _mm256_loadu_ps(q_matrix.as_ptr().add(base)),
        );
        let bias = _mm256_or_ps(_mm256_and_ps(t, sign_mask), half);
        let rounded = _mm256_cvttps_epi32(_mm256_add_ps(t, bias));

        let lo = _mm256_castsi256_si128(rounded);
        let hi = _mm256_extracti128_si256::<1>(rounded);
        let packed = _mm_packs_epi32(lo, hi);
        _mm_storeu_si128(output.as_mut_ptr().add(base) as *mut __m128i, packed);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn block_activity_avx2(block: &[f32; 64]) -> f32 {
    let mut total = _mm256_setzero_ps();
    for chunk in 0..8 {
        total = _mm256_add_ps(total, _mm256_loadu_ps(block.as_ptr().add(chunk * 8)));
    }
    let mean = _mm256_set1_ps(sum8(total) / 64.0);

    let mut acc = _mm256_setzero_ps();
    for chunk in 0..8 {
        let v = _mm256_loadu_ps(block.as_ptr().add(chunk * 8));
        let d = _mm256_sub_ps(v, mean);
        acc = _mm256_add_ps(acc, _mm256_mul_ps(d, d));
    }
    sum8(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scalar, DispatchBackend};

    fn avx2_available() -> bool {
        DispatchBackend::Avx2.is_available()
    }

    #[test]
    fn test_quantize_matches_scalar_exactly() {
        if !avx2_available() {
            return;
        }
        let block: [f32; 64] = core::array::from_fn(|i| (i as f32 - 20.0) * 1.17);
        let q: [f32; 64] = core::array::from_fn(|i| 0.5 + (i % 5) as f32);
        let mut expected = [0i16; 64];
        let mut got = [0i16; 64];
        scalar::quantize(&block, &q, &mut expected);
        Avx2Ops.quantize(&block, &q, &mut got);
        assert_eq!(expected, got);
    }

    #[test]
    fn test_dct_matches_scalar() {
        if !avx2_available() {
            return;
        }
        let input: [f32; 64] = core::array::from_fn(|i| ((i * 11) % 23) as f32 / 23.0 - 0.5);
        let mut expected = [0.0f32; 64];
        let mut got = [0.0f32; 64];
        scalar::dct2d(&input, &mut expected);
        Avx2Ops.dct2d(&input, &mut got);
        for i in 0..64 {
            assert!((expected[i] - got[i]).abs() < 1e-4);
        }
    }

    #[test]
    fn test_activity_matches_scalar() {
        if !avx2_available() {
            return;
        }
        let block: [f32; 64] = core::array::from_fn(|i| ((i * 19) % 31) as f32 / 31.0);
        let expected = scalar::block_activity(&block);
        let got = Avx2Ops.block_activity(&block);
        assert!((expected - got).abs() < 1e-4);
    }
}
