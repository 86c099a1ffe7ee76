//! sRGB transfer curve

/// Convert sRGB to linear RGB (gamma expansion)
pub fn srgb_to_linear(srgb: f32) -> f32 {
    if srgb <= 0.04045 {
        srgb / 12.92
    } else {
        ((srgb + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert linear RGB to sRGB (gamma compression)
pub fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Convert an sRGB buffer to linear RGB in place
pub fn srgb_buffer_to_linear(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = srgb_to_linear(*v);
    }
}
