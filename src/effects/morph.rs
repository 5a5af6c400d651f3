use image::RgbaImage;
use rayon::prelude::*;

use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::foundation::math::clamp_u8;

/// Full-range (JPEG) RGB to YCbCr, quantized to 8 bits.
pub fn rgb_to_ycbcr([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    [
        clamp_u8(0.299 * r + 0.587 * g + 0.114 * b),
        clamp_u8(128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b),
        clamp_u8(128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b),
    ]
}

pub fn ycbcr_to_rgb([y, cb, cr]: [u8; 3]) -> [u8; 3] {
    let (y, cb, cr) = (f64::from(y), f64::from(cb) - 128.0, f64::from(cr) - 128.0);
    [
        clamp_u8(y + 1.402 * cr),
        clamp_u8(y - 0.344_136 * cb - 0.714_136 * cr),
        clamp_u8(y + 1.772 * cb),
    ]
}

fn to_ycbcr_planes(img: &RgbaImage) -> Vec<[u8; 4]> {
    img.as_raw()
        .par_chunks_exact(4)
        .map(|p| {
            let [y, cb, cr] = rgb_to_ycbcr([p[0], p[1], p[2]]);
            [y, cb, cr, p[3]]
        })
        .collect()
}

/// `n` intermediate frames from `a` towards `b`, excluding both endpoints.
///
/// Both frames are interpolated in YCbCr space in `n + 1` equal steps; step `i` of `n` is
/// `a + (b - a) * i / (n + 1)` per channel.
pub fn morph(a: &RgbaImage, b: &RgbaImage, n: u32) -> AnimatorResult<Vec<RgbaImage>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if a.dimensions() != b.dimensions() {
        return Err(AnimatorError::render(format!(
            "morph endpoints differ in size: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    let (w, h) = a.dimensions();
    let ya = to_ycbcr_planes(a);
    let yb = to_ycbcr_planes(b);
    let steps = f64::from(n) + 1.0;

    (1..=n)
        .map(|i| {
            let t = f64::from(i) / steps;
            let mut out = vec![0u8; ya.len() * 4];
            out.par_chunks_exact_mut(4)
                .zip(ya.par_iter().zip(yb.par_iter()))
                .for_each(|(px, (pa, pb))| {
                    let mut mixed = [0u8; 4];
                    for c in 0..4 {
                        let (va, vb) = (f64::from(pa[c]), f64::from(pb[c]));
                        // Truncate towards zero like an 8-bit cast.
                        mixed[c] = (va + (vb - va) * t).clamp(0.0, 255.0) as u8;
                    }
                    let [r, g, b] = ycbcr_to_rgb([mixed[0], mixed[1], mixed[2]]);
                    px.copy_from_slice(&[r, g, b, mixed[3]]);
                });
            RgbaImage::from_raw(w, h, out)
                .ok_or_else(|| AnimatorError::render("morph buffer size mismatch"))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/morph.rs"]
mod tests;
