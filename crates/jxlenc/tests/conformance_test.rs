//! Backend conformance: every available backend against the scalar
//! reference, plus the resource-bound properties

use jxlenc::{
    AlphaMode, ColorSpace, DispatchBackend, EncodingOptions, HardwareCapabilities, ImageFrame,
    JxlEncoder, PixelType,
};
use jxlenc_kernels::{scalar, Kernels, ScalarOps};

/// Small deterministic xorshift generator so the corpus is stable
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 32) as u32
    }

    fn next_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (self.next_u32() as f32 / u32::MAX as f32) * (hi - lo)
    }
}

fn random_block(rng: &mut XorShift, lo: f32, hi: f32) -> [f32; 64] {
    core::array::from_fn(|_| rng.next_f32(lo, hi))
}

fn available_backends() -> Vec<DispatchBackend> {
    DispatchBackend::all()
        .into_iter()
        .filter(|b| b.is_available() && *b != DispatchBackend::Scalar)
        .collect()
}

#[test]
fn dct_conformance() {
    let mut rng = XorShift::new(7);
    for backend in available_backends() {
        let ops = backend.ops();
        for _ in 0..32 {
            let block = random_block(&mut rng, -1.0, 1.0);
            let mut expected = [0.0f32; 64];
            let mut got = [0.0f32; 64];
            ScalarOps.dct2d(&block, &mut expected);
            ops.dct2d(&block, &mut got);
            for i in 0..64 {
                assert!(
                    (expected[i] - got[i]).abs() <= 1e-4,
                    "{} dct at {}: {} vs {}",
                    backend.display_name(),
                    i,
                    expected[i],
                    got[i]
                );
            }

            let mut inv_expected = [0.0f32; 64];
            let mut inv_got = [0.0f32; 64];
            ScalarOps.idct2d(&expected, &mut inv_expected);
            ops.idct2d(&expected, &mut inv_got);
            for i in 0..64 {
                assert!((inv_expected[i] - inv_got[i]).abs() <= 1e-4);
            }
        }
    }
}

#[test]
fn dct_roundtrip_within_tolerance() {
    let mut rng = XorShift::new(11);
    for _ in 0..64 {
        let block = random_block(&mut rng, -1.0, 1.0);
        let mut coefficients = [0.0f32; 64];
        let mut back = [0.0f32; 64];
        ScalarOps.dct2d(&block, &mut coefficients);
        ScalarOps.idct2d(&coefficients, &mut back);
        for i in 0..64 {
            assert!((block[i] - back[i]).abs() <= 1e-4);
        }
    }
}

#[test]
fn ycbcr_conformance_with_ragged_lengths() {
    let mut rng = XorShift::new(23);
    for backend in available_backends() {
        let ops = backend.ops();
        // Lengths around the lane counts exercise the scalar tails.
        for n in [1usize, 3, 4, 5, 8, 13, 64, 101] {
            let r: Vec<f32> = (0..n).map(|_| rng.next_f32(0.0, 1.0)).collect();
            let g: Vec<f32> = (0..n).map(|_| rng.next_f32(0.0, 1.0)).collect();
            let b: Vec<f32> = (0..n).map(|_| rng.next_f32(0.0, 1.0)).collect();

            let (mut y1, mut cb1, mut cr1) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
            let (mut y2, mut cb2, mut cr2) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
            ScalarOps.rgb_to_ycbcr(&r, &g, &b, &mut y1, &mut cb1, &mut cr1);
            ops.rgb_to_ycbcr(&r, &g, &b, &mut y2, &mut cb2, &mut cr2);

            for i in 0..n {
                assert!((y1[i] - y2[i]).abs() <= 1e-5, "{}", backend.display_name());
                assert!((cb1[i] - cb2[i]).abs() <= 1e-5);
                assert!((cr1[i] - cr2[i]).abs() <= 1e-5);
            }
        }
    }
}

#[test]
fn xyb_roundtrip_conformance() {
    let mut rng = XorShift::new(31);
    let backends: Vec<_> = std::iter::once(DispatchBackend::Scalar)
        .chain(available_backends())
        .collect();
    for backend in backends {
        let ops = backend.ops();
        let n = 97;
        let r: Vec<f32> = (0..n).map(|_| rng.next_f32(0.0, 1.0)).collect();
        let g: Vec<f32> = (0..n).map(|_| rng.next_f32(0.0, 1.0)).collect();
        let b: Vec<f32> = (0..n).map(|_| rng.next_f32(0.0, 1.0)).collect();

        let (mut x, mut y, mut bch) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        ops.rgb_to_xyb(&r, &g, &b, &mut x, &mut y, &mut bch);
        let (mut r2, mut g2, mut b2) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        ops.xyb_to_rgb(&x, &y, &bch, &mut r2, &mut g2, &mut b2);

        for i in 0..n {
            assert!((r[i] - r2[i]).abs() <= 1e-3, "{}", backend.display_name());
            assert!((g[i] - g2[i]).abs() <= 1e-3);
            assert!((b[i] - b2[i]).abs() <= 1e-3);
        }
    }
}

#[test]
fn quantize_conformance_is_exact() {
    let mut rng = XorShift::new(43);
    for backend in available_backends() {
        let ops = backend.ops();
        for _ in 0..64 {
            let block = random_block(&mut rng, -500.0, 500.0);
            let q: [f32; 64] = core::array::from_fn(|_| rng.next_f32(0.5, 64.0));
            let mut expected = [0i16; 64];
            let mut got = [0i16; 64];
            ScalarOps.quantize(&block, &q, &mut expected);
            ops.quantize(&block, &q, &mut got);
            assert_eq!(expected, got, "{}", backend.display_name());
        }
    }
}

#[test]
fn integer_kernels_conformance_is_exact() {
    let mut rng = XorShift::new(53);
    for backend in available_backends() {
        let ops = backend.ops();

        // Zigzag: exact permutation.
        let block: [i16; 64] = core::array::from_fn(|_| rng.next_u32() as i16);
        let mut expected = [0i16; 64];
        let mut got = [0i16; 64];
        ScalarOps.zigzag_scan(&block, &mut expected);
        ops.zigzag_scan(&block, &mut got);
        assert_eq!(expected, got);
        let mut sorted_in = block.to_vec();
        let mut sorted_out = got.to_vec();
        sorted_in.sort_unstable();
        sorted_out.sort_unstable();
        assert_eq!(sorted_in, sorted_out);

        // MED residuals.
        let (w, h) = (17, 9);
        let raster: Vec<u16> = (0..w * h).map(|_| rng.next_u32() as u16).collect();
        let mut med_expected = Vec::new();
        let mut med_got = Vec::new();
        ScalarOps.predict_med(&raster, w, h, &mut med_expected);
        ops.predict_med(&raster, w, h, &mut med_got);
        assert_eq!(med_expected, med_got);

        // RCT forward and exact round-trip.
        let n = 64;
        let r: Vec<u16> = (0..n).map(|_| rng.next_u32() as u16).collect();
        let g: Vec<u16> = (0..n).map(|_| rng.next_u32() as u16).collect();
        let b: Vec<u16> = (0..n).map(|_| rng.next_u32() as u16).collect();
        let (mut y, mut co, mut cg) = (vec![0; n], vec![0; n], vec![0; n]);
        ops.forward_rct(&r, &g, &b, &mut y, &mut co, &mut cg);
        let (mut r2, mut g2, mut b2) = (vec![0; n], vec![0; n], vec![0; n]);
        ops.inverse_rct(&y, &co, &cg, &mut r2, &mut g2, &mut b2);
        assert_eq!(r, r2);
        assert_eq!(g, g2);
        assert_eq!(b, b2);

        // Squeeze: exact against scalar.
        let (rw, rh, stride) = (13, 6, 16);
        let mut plane_a: Vec<i32> = (0..stride * rh).map(|_| rng.next_u32() as i32 >> 8).collect();
        let mut plane_b = plane_a.clone();
        ScalarOps.squeeze_horizontal(&mut plane_a, rw, rh, stride);
        ops.squeeze_horizontal(&mut plane_b, rw, rh, stride);
        assert_eq!(plane_a, plane_b);
        ScalarOps.squeeze_vertical(&mut plane_a, rw, rh, stride);
        ops.squeeze_vertical(&mut plane_b, rw, rh, stride);
        assert_eq!(plane_a, plane_b);
    }
}

#[test]
fn block_activity_conformance() {
    let mut rng = XorShift::new(61);
    for backend in available_backends() {
        let ops = backend.ops();
        for _ in 0..64 {
            let block = random_block(&mut rng, -1.0, 1.0);
            let expected = ScalarOps.block_activity(&block);
            let got = ops.block_activity(&block);
            assert!(got >= 0.0);
            assert!(
                (expected - got).abs() <= 1e-4,
                "{}: {} vs {}",
                backend.display_name(),
                expected,
                got
            );
        }
        assert_eq!(ops.block_activity(&[0.75; 64]), 0.0);
    }
}

#[test]
fn med_reconstruction_is_exact() {
    let mut rng = XorShift::new(71);
    let (w, h) = (21, 13);
    let plane: Vec<i32> = (0..w * h).map(|_| (rng.next_u32() % 1024) as i32 - 512).collect();
    let mut residuals = Vec::new();
    scalar::predict_med_i32(&plane, w, h, &mut residuals);
    assert_eq!(scalar::reconstruct_med_i32(&residuals, w, h), plane);
}

#[test]
fn hardware_probe_is_consistent() {
    let caps = HardwareCapabilities::detect();
    assert!(caps.core_count >= 1);
    assert_eq!(
        DispatchBackend::Avx2.is_available(),
        cfg!(target_arch = "x86_64") && caps.has_avx2
    );
}

#[test]
fn peak_memory_stays_bounded() {
    // 1024x1024 RGB through the lossless path: tracked scratch must stay
    // well under 60 MB for one megapixel and must not grow across
    // repeated encodes.
    let frame = ImageFrame::new(
        1024,
        1024,
        3,
        PixelType::U8,
        ColorSpace::Srgb,
        8,
        false,
        AlphaMode::None,
    )
    .unwrap();
    let encoder = JxlEncoder::new(EncodingOptions::lossless());

    let first = encoder.encode(&frame).unwrap();
    assert!(
        first.stats.peak_memory < 60 * 1024 * 1024,
        "peak {} bytes",
        first.stats.peak_memory
    );

    for _ in 0..3 {
        let again = encoder.encode(&frame).unwrap();
        assert_eq!(again.stats.peak_memory, first.stats.peak_memory);
    }
}
