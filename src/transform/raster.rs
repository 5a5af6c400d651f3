//! Bridges between `image` buffers and the `vello_cpu` rasterizer, plus a separable
//! Gaussian blur.

use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;
use vello_cpu::kurbo::Shape;

use crate::foundation::error::{AnimatorError, AnimatorResult};

pub(crate) fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

/// Flatten any `vello_cpu` shape into a path for `fill_path`.
pub(crate) fn shape_to_cpu(shape: &impl Shape) -> vello_cpu::kurbo::BezPath {
    let mut p = vello_cpu::kurbo::BezPath::new();
    for el in shape.path_elements(0.1) {
        p.push(el);
    }
    p
}

fn dims_u16(width: u32, height: u32) -> AnimatorResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| AnimatorError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| AnimatorError::render("pixmap height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(AnimatorError::render("pixmap must be non-empty"));
    }
    Ok((w, h))
}

/// Premultiply a straight-alpha image into a pixmap.
pub(crate) fn pixmap_from_rgba(img: &RgbaImage) -> AnimatorResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(img.width(), img.height())?;
    let pixels = img
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            let a16 = u16::from(a);
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([
                mul_div255(r, a16),
                mul_div255(g, a16),
                mul_div255(b, a16),
                a,
            ])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

/// Un-premultiply a pixmap back into a straight-alpha image.
pub(crate) fn rgba_from_pixmap(pm: &vello_cpu::Pixmap) -> RgbaImage {
    let (w, h) = (u32::from(pm.width()), u32::from(pm.height()));
    let mut out = pm.data_as_u8_slice().to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    // Buffer length always matches w*h*4.
    RgbaImage::from_raw(w, h, out).unwrap_or_else(|| RgbaImage::new(w, h))
}

pub(crate) fn image_paint(img: &RgbaImage) -> AnimatorResult<vello_cpu::Image> {
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap_from_rgba(img)?)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Render `draw` on top of `base` and return the flattened result.
///
/// The context starts with `base` painted at identity; `draw` may change transform and
/// paint freely.
pub(crate) fn render_over(
    base: &RgbaImage,
    draw: impl FnOnce(&mut vello_cpu::RenderContext) -> AnimatorResult<()>,
) -> AnimatorResult<RgbaImage> {
    let (w, h) = dims_u16(base.width(), base.height())?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(image_paint(base)?);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

    draw(&mut ctx)?;

    ctx.flush();
    let mut pm = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pm);
    Ok(rgba_from_pixmap(&pm))
}

fn mul_div255(c: u8, a: u16) -> u8 {
    ((u16::from(c) * a + 127) / 255) as u8
}

/// Gaussian blur with standard deviation `sigma` pixels (kernel radius `ceil(3 * sigma)`).
pub fn gaussian_blur(img: &RgbaImage, sigma: f32) -> AnimatorResult<RgbaImage> {
    if sigma <= 0.0 {
        return Ok(img.clone());
    }
    let radius = (sigma * 3.0).ceil() as u32;
    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let (w, h) = img.dimensions();
    let mut tmp = vec![0u8; img.as_raw().len()];
    let mut out = vec![0u8; img.as_raw().len()];
    horizontal_pass(img.as_raw(), &mut tmp, w, &kernel);
    vertical_pass(&tmp, &mut out, w, h, &kernel);
    RgbaImage::from_raw(w, h, out).ok_or_else(|| AnimatorError::render("blur buffer size mismatch"))
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> AnimatorResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(AnimatorError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f = (-r..=r)
        .map(|i| (-(i as f64) * (i as f64) / denom).exp())
        .collect::<Vec<_>>();
    let sum = weights_f.iter().sum::<f64>();
    if sum <= 0.0 {
        return Err(AnimatorError::render("gaussian kernel sum is zero"));
    }

    let mut weights = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect::<Vec<_>>();
    let acc = weights.iter().map(|&q| i64::from(q)).sum::<i64>();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let stride = width as usize * 4;
    dst.par_chunks_mut(stride)
        .zip(src.par_chunks(stride))
        .for_each(|(out_row, in_row)| {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x + ki as i32 - radius).clamp(0, w - 1) as usize * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(in_row[sx + c]);
                    }
                }
                let o = x as usize * 4;
                for c in 0..4 {
                    out_row[o + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let h = height as i32;
    let stride = width as usize * 4;
    dst.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, out_row)| {
            for x in 0..stride {
                let mut acc = 0u64;
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y as i32 + ki as i32 - radius).clamp(0, h - 1) as usize;
                    acc += u64::from(kw) * u64::from(src[sy * stride + x]);
                }
                out_row[x] = q16_to_u8(acc);
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/transform/raster.rs"]
mod tests;
