//! LAB histogram matching against a captured reference frame.

use image::{GrayImage, RgbaImage};
use rayon::prelude::*;

/// Per-channel LAB histograms of the frame colors are anchored to.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorReference {
    histograms: [[u64; 256]; 3],
}

impl ColorReference {
    pub fn capture(img: &RgbaImage) -> Self {
        Self {
            histograms: lab_histograms(&to_lab(img)),
        }
    }

    /// Match `img`'s LAB histograms to the reference.
    ///
    /// With a mask, corrected pixels are blended in where the mask is white and the original
    /// pixels are kept where it is black.
    pub fn apply(&self, img: &RgbaImage, mask: Option<&GrayImage>) -> RgbaImage {
        let lab = to_lab(img);
        let src_hist = lab_histograms(&lab);
        let luts: [[u8; 256]; 3] =
            std::array::from_fn(|c| match_lut(&src_hist[c], &self.histograms[c]));

        let mut out = img.clone();
        out.par_chunks_mut(4)
            .zip(lab.par_chunks(3))
            .for_each(|(px, l)| {
                let matched = [
                    luts[0][l[0] as usize],
                    luts[1][l[1] as usize],
                    luts[2][l[2] as usize],
                ];
                px[..3].copy_from_slice(&lab_to_rgb(matched));
            });

        let Some(mask) = mask else {
            return out;
        };
        let mask = if mask.dimensions() == img.dimensions() {
            mask.clone()
        } else {
            image::imageops::resize(
                mask,
                img.width(),
                img.height(),
                image::imageops::FilterType::Lanczos3,
            )
        };
        for ((o, src), m) in out.pixels_mut().zip(img.pixels()).zip(mask.pixels()) {
            let m = u32::from(m.0[0]);
            for c in 0..4 {
                o.0[c] = ((u32::from(o.0[c]) * m + u32::from(src.0[c]) * (255 - m) + 127) / 255)
                    as u8;
            }
        }
        out
    }
}

fn lab_histograms(lab: &[u8]) -> [[u64; 256]; 3] {
    let mut h = [[0u64; 256]; 3];
    for px in lab.chunks_exact(3) {
        for c in 0..3 {
            h[c][px[c] as usize] += 1;
        }
    }
    h
}

/// Cumulative-distribution matching: each source value maps to the template value at the
/// same quantile, linearly interpolated between template values that occur.
fn match_lut(src: &[u64; 256], tmpl: &[u64; 256]) -> [u8; 256] {
    let src_total = src.iter().sum::<u64>().max(1) as f64;
    let tmpl_total = tmpl.iter().sum::<u64>().max(1) as f64;

    let mut tmpl_points = Vec::new();
    let mut acc = 0u64;
    for (v, &n) in tmpl.iter().enumerate() {
        if n > 0 {
            acc += n;
            tmpl_points.push((acc as f64 / tmpl_total, v as f64));
        }
    }

    let mut lut = [0u8; 256];
    let mut acc = 0u64;
    for (v, &n) in src.iter().enumerate() {
        acc += n;
        let q = acc as f64 / src_total;
        lut[v] = interp(q, &tmpl_points).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Piecewise-linear lookup with held edges.
fn interp(x: f64, points: &[(f64, f64)]) -> f64 {
    let Some(&(x0, y0)) = points.first() else {
        return 0.0;
    };
    if x <= x0 {
        return y0;
    }
    for pair in points.windows(2) {
        let ((xa, ya), (xb, yb)) = (pair[0], pair[1]);
        if x <= xb {
            return ya + (yb - ya) * (x - xa) / (xb - xa);
        }
    }
    points[points.len() - 1].1
}

// 8-bit CIELAB (D65) as used by common imaging libraries: L scaled to 0..=255, a/b offset
// by 128.
const XN: f64 = 0.950456;
const ZN: f64 = 1.088754;

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(f: f64) -> f64 {
    let t = f * f * f;
    if t > 0.008856 {
        t
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

pub(crate) fn rgb_to_lab(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| srgb_to_linear(f64::from(c) / 255.0));
    let x = (0.412453 * r + 0.357580 * g + 0.180423 * b) / XN;
    let y = 0.212671 * r + 0.715160 * g + 0.072169 * b;
    let z = (0.019334 * r + 0.119193 * g + 0.950227 * b) / ZN;

    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
    let l = if y > 0.008856 {
        116.0 * fy - 16.0
    } else {
        903.3 * y
    };
    let a = 500.0 * (fx - fy) + 128.0;
    let bb = 200.0 * (fy - fz) + 128.0;
    [l * 255.0 / 100.0, a, bb].map(|v| v.round().clamp(0.0, 255.0) as u8)
}

pub(crate) fn lab_to_rgb(lab: [u8; 3]) -> [u8; 3] {
    let l = f64::from(lab[0]) * 100.0 / 255.0;
    let a = f64::from(lab[1]) - 128.0;
    let b = f64::from(lab[2]) - 128.0;

    let fy = (l + 16.0) / 116.0;
    let y = if l > 903.3 * 0.008856 {
        fy * fy * fy
    } else {
        l / 903.3
    };
    let fy = if y > 0.008856 { fy } else { 7.787 * y + 16.0 / 116.0 };
    let x = lab_f_inv(fy + a / 500.0) * XN;
    let z = lab_f_inv(fy - b / 200.0) * ZN;

    let r = 3.240479 * x - 1.537150 * y - 0.498535 * z;
    let g = -0.969256 * x + 1.875992 * y + 0.041556 * z;
    let bl = 0.055648 * x - 0.204043 * y + 1.057311 * z;
    [r, g, bl].map(|c| {
        (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0)
            .round()
            .clamp(0.0, 255.0) as u8
    })
}

fn to_lab(img: &RgbaImage) -> Vec<u8> {
    let mut lab = vec![0u8; (img.width() * img.height()) as usize * 3];
    lab.par_chunks_mut(3)
        .zip(img.as_raw().par_chunks(4))
        .for_each(|(l, px)| l.copy_from_slice(&rgb_to_lab([px[0], px[1], px[2]])));
    lab
}

#[cfg(test)]
#[path = "../../tests/unit/transform/color_correction.rs"]
mod tests;
