//! Accelerate backend (macOS)
//!
//! Delegates the vectorizable float kernels to the platform's vDSP
//! routines through direct framework linking; everything without a clean
//! vDSP mapping stays on the shared scalar code.

use std::ffi::{c_long, c_ulong};

use crate::{dct, Kernels};

#[link(name = "Accelerate", kind = "framework")]
extern "C" {
    fn vDSP_vsmul(a: *const f32, ia: c_long, b: *const f32, c: *mut f32, ic: c_long, n: c_ulong);
    fn vDSP_vsma(
        a: *const f32,
        ia: c_long,
        b: *const f32,
        c: *const f32,
        ic: c_long,
        d: *mut f32,
        id: c_long,
        n: c_ulong,
    );
    fn vDSP_vsadd(a: *const f32, ia: c_long, b: *const f32, c: *mut f32, ic: c_long, n: c_ulong);
    fn vDSP_meanv(a: *const f32, ia: c_long, c: *mut f32, n: c_ulong);
    fn vDSP_svesq(a: *const f32, ia: c_long, c: *mut f32, n: c_ulong);
}

/// One output plane as `a*r + b*g + c*b + d`, fused through vDSP
unsafe fn weighted_sum(
    r: &[f32],
    g: &[f32],
    b: &[f32],
    coeffs: [f32; 4],
    out: &mut [f32],
) {
    let n = r.len() as c_ulong;
    vDSP_vsmul(r.as_ptr(), 1, &coeffs[0], out.as_mut_ptr(), 1, n);
    vDSP_vsma(g.as_ptr(), 1, &coeffs[1], out.as_ptr(), 1, out.as_mut_ptr(), 1, n);
    vDSP_vsma(b.as_ptr(), 1, &coeffs[2], out.as_ptr(), 1, out.as_mut_ptr(), 1, n);
    if coeffs[3] != 0.0 {
        vDSP_vsadd(out.as_ptr(), 1, &coeffs[3], out.as_mut_ptr(), 1, n);
    }
}

/// The Accelerate (vDSP) backend
#[derive(Debug, Default, Clone, Copy)]
pub struct AccelerateOps;

impl Kernels for AccelerateOps {
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
        unsafe {
            weighted_sum(r, g, b, [0.299, 0.587, 0.114, 0.0], y);
            weighted_sum(r, g, b, [-0.168736, -0.331264, 0.5, 0.5], cb);
            weighted_sum(r, g, b, [0.5, -0.418688, -0.081312, 0.5], cr);
        }
    }

    fn block_activity(&self, block: &[f32; 64]) -> f32 {
        let mut mean = 0.0f32;
        let mut centered = [0.0f32; 64];
        let mut sum_sq = 0.0f32;
        unsafe {
            vDSP_meanv(block.as_ptr(), 1, &mut mean, 64);
            let neg_mean = -mean;
            vDSP_vsadd(block.as_ptr(), 1, &neg_mean, centered.as_mut_ptr(), 1, 64);
            vDSP_svesq(centered.as_ptr(), 1, &mut sum_sq, 64);
        }
        sum_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{self, ScalarOps};

    #[test]
    fn test_ycbcr_matches_scalar() {
        let r: Vec<f32> = (0..33).map(|i| i as f32 / 32.0).collect();
        let g: Vec<f32> = (0..33).map(|i| (32 - i) as f32 / 32.0).collect();
        let b: Vec<f32> = (0..33).map(|i| (i % 5) as f32 / 4.0).collect();

        let n = r.len();
        let (mut y1, mut cb1, mut cr1) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        let (mut y2, mut cb2, mut cr2) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);

        ScalarOps.rgb_to_ycbcr(&r, &g, &b, &mut y1, &mut cb1, &mut cr1);
        AccelerateOps.rgb_to_ycbcr(&r, &g, &b, &mut y2, &mut cb2, &mut cr2);

        for i in 0..n {
            assert!((y1[i] - y2[i]).abs() < 1e-5);
            assert!((cb1[i] - cb2[i]).abs() < 1e-5);
            assert!((cr1[i] - cr2[i]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_activity_matches_scalar() {
        let block: [f32; 64] = core::array::from_fn(|i| ((i * 23) % 37) as f32 / 37.0);
        let expected = scalar::block_activity(&block);
        let got = AccelerateOps.block_activity(&block);
        assert!((expected - got).abs() < 1e-4);
    }
}
