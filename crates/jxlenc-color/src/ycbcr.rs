//! BT.601 full-range luma/chroma conversion

/// Convert one RGB sample to YCbCr (BT.601 full range)
///
/// Chroma planes are centered on 0.5 so that mid-gray maps to
/// (gray, 0.5, 0.5).
#[inline]
pub fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = -0.168736 * r - 0.331264 * g + 0.5 * b + 0.5;
    let cr = 0.5 * r - 0.418688 * g - 0.081312 * b + 0.5;
    (y, cb, cr)
}

/// Convert one YCbCr sample back to RGB (BT.601 full range)
#[inline]
pub fn ycbcr_to_rgb(y: f32, cb: f32, cr: f32) -> (f32, f32, f32) {
    let cb = cb - 0.5;
    let cr = cr - 0.5;
    let r = y + 1.402 * cr;
    let g = y - 0.344136 * cb - 0.714136 * cr;
    let b = y + 1.772 * cb;
    (r, g, b)
}

/// Convert planar RGB buffers to planar YCbCr
pub fn rgb_planes_to_ycbcr(
    r: &[f32],
    g: &[f32],
    b: &[f32],
    y: &mut [f32],
    cb: &mut [f32],
    cr: &mut [f32],
) {
    debug_assert!(r.len() == g.len() && g.len() == b.len());
    debug_assert!(y.len() == r.len() && cb.len() == r.len() && cr.len() == r.len());
    for i in 0..r.len() {
        let (yy, cbb, crr) = rgb_to_ycbcr(r[i], g[i], b[i]);
        y[i] = yy;
        cb[i] = cbb;
        cr[i] = crr;
    }
}
