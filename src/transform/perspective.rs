use image::RgbaImage;
use rayon::prelude::*;

use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::foundation::math::clamp_u8;
use crate::transform::raster::gaussian_blur;

const UNSHARP_RADIUS: f32 = 2.0;
const UNSHARP_THRESHOLD: i32 = 3;

/// 3x3 projective matrix, row-major, `m[8] == 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography(pub [f64; 9]);

impl Homography {
    /// Solve the homography that maps each `from[i]` onto `to[i]`.
    pub fn from_points(from: [(f64, f64); 4], to: [(f64, f64); 4]) -> AnimatorResult<Self> {
        let mut a = [[0.0f64; 9]; 8];
        for (i, (&(x, y), &(u, v))) in from.iter().zip(to.iter()).enumerate() {
            a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, u];
            a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y, v];
        }
        let h = solve8(a).ok_or_else(|| {
            AnimatorError::render("degenerate perspective corners (no unique homography)")
        })?;
        Ok(Self([h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0]))
    }

    pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let m = &self.0;
        let d = m[6] * x + m[7] * y + m[8];
        if d.abs() < 1e-12 {
            return None;
        }
        Some((
            (m[0] * x + m[1] * y + m[2]) / d,
            (m[3] * x + m[4] * y + m[5]) / d,
        ))
    }
}

/// Gaussian elimination with partial pivoting on an augmented 8x9 system.
fn solve8(mut a: [[f64; 9]; 8]) -> Option<[f64; 8]> {
    for col in 0..8 {
        let pivot = (col..8).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-10 {
            return None;
        }
        a.swap(col, pivot);
        for row in 0..8 {
            if row == col {
                continue;
            }
            let f = a[row][col] / a[col][col];
            if f == 0.0 {
                continue;
            }
            for k in col..9 {
                a[row][k] -= f * a[col][k];
            }
        }
    }
    let mut out = [0.0; 8];
    for (i, v) in out.iter_mut().enumerate() {
        *v = a[i][8] / a[i][i];
    }
    Some(out)
}

/// Warp `img` so that the frame corners, displaced by `deltas` (top-left, top-right,
/// bottom-right, bottom-left), land on the frame rectangle; then sharpen with an unsharp
/// mask of `unsharpen` percent. Pixels mapped from outside the source are opaque black.
pub fn perspective_warp(
    img: &RgbaImage,
    deltas: [(f64, f64); 4],
    unsharpen: f64,
) -> AnimatorResult<RgbaImage> {
    if deltas.iter().all(|&(dx, dy)| dx == 0.0 && dy == 0.0) {
        return Ok(img.clone());
    }
    let (w, h) = img.dimensions();
    let (wf, hf) = (f64::from(w), f64::from(h));
    let rect = [(0.0, 0.0), (wf, 0.0), (wf, hf), (0.0, hf)];
    let mut src = rect;
    for (p, (dx, dy)) in src.iter_mut().zip(deltas) {
        p.0 += dx;
        p.1 += dy;
    }
    // Inverse mapping: output pixel -> source position.
    let inverse = Homography::from_points(rect, src)?;

    let stride = w as usize * 4;
    let mut out = vec![0u8; img.as_raw().len()];
    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..w as usize {
                let px = inverse
                    .apply(x as f64, y as f64)
                    .and_then(|(sx, sy)| sample_bilinear(img, sx, sy))
                    .unwrap_or([0, 0, 0, 255]);
                row[x * 4..x * 4 + 4].copy_from_slice(&px);
            }
        });
    let warped = RgbaImage::from_raw(w, h, out)
        .ok_or_else(|| AnimatorError::render("warp buffer size mismatch"))?;
    unsharp_mask(&warped, unsharpen)
}

fn sample_bilinear(img: &RgbaImage, x: f64, y: f64) -> Option<[u8; 4]> {
    let (w, h) = img.dimensions();
    if x < 0.0 || y < 0.0 || x > f64::from(w - 1) || y > f64::from(h - 1) {
        return None;
    }
    let (x0, y0) = (x.floor() as u32, y.floor() as u32);
    let (x1, y1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1));
    let (fx, fy) = (x - f64::from(x0), y - f64::from(y0));
    let p = |xx, yy| img.get_pixel(xx, yy).0;
    let (a, b, c, d) = (p(x0, y0), p(x1, y0), p(x0, y1), p(x1, y1));
    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = f64::from(a[i]) * (1.0 - fx) + f64::from(b[i]) * fx;
        let bottom = f64::from(c[i]) * (1.0 - fx) + f64::from(d[i]) * fx;
        out[i] = clamp_u8(top * (1.0 - fy) + bottom * fy);
    }
    Some(out)
}

/// Unsharp mask on the color channels: where `|orig - blurred| >= 3`, push the pixel away
/// from the blurred value by `percent`%.
pub fn unsharp_mask(img: &RgbaImage, percent: f64) -> AnimatorResult<RgbaImage> {
    if percent == 0.0 {
        return Ok(img.clone());
    }
    let blurred = gaussian_blur(img, UNSHARP_RADIUS)?;
    let mut out = img.clone();
    for (o, b) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let diff = i32::from(o.0[c]) - i32::from(b.0[c]);
            if diff.abs() >= UNSHARP_THRESHOLD {
                o.0[c] = clamp_u8(f64::from(o.0[c]) + f64::from(diff) * percent / 100.0);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/perspective.rs"]
mod tests;
