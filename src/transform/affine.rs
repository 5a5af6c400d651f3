use image::RgbaImage;
use image::imageops::{self, FilterType};
use kurbo::{Affine, Vec2};
use rand::Rng;

use crate::foundation::error::AnimatorResult;
use crate::transform::noise::add_noise;
use crate::transform::raster::{affine_to_cpu, gaussian_blur, image_paint, render_over};

const BACKGROUND_PADDING: u32 = 2;
const BACKGROUND_NOISE: f64 = 0.75;
const BACKGROUND_BLUR_SIGMA: f32 = 5.0;

/// Zoom, rotate (degrees, counter-clockwise) and shift (whole pixels) a frame.
///
/// Areas uncovered by the moved frame show a blurred, noised copy of the original so the
/// generator has plausible content to paint over.
pub fn transform_frame(
    img: &RgbaImage,
    rotation_deg: f64,
    x: i64,
    y: i64,
    zoom: f64,
    rng: &mut impl Rng,
) -> AnimatorResult<RgbaImage> {
    let (w, h) = img.dimensions();
    let background = blurred_background(img, rng)?;

    let zw = (f64::from(w) * zoom).max(0.0) as u32;
    let zh = (f64::from(h) * zoom).max(0.0) as u32;
    if zw == 0 || zh == 0 {
        return Ok(background);
    }
    let zoomed = if (zw, zh) == (w, h) {
        img.clone()
    } else {
        imageops::resize(img, zw, zh, FilterType::Lanczos3)
    };

    let center = Vec2::new(f64::from(w) / 2.0 + x as f64, f64::from(h) / 2.0 + y as f64);
    let placement = Affine::translate(center)
        * Affine::rotate(-rotation_deg.to_radians())
        * Affine::translate(Vec2::new(-f64::from(zw) / 2.0, -f64::from(zh) / 2.0));

    let paint = image_paint(&zoomed)?;
    render_over(&background, |ctx| {
        ctx.set_transform(affine_to_cpu(placement));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(zw),
            f64::from(zh),
        ));
        Ok(())
    })
}

fn blurred_background(img: &RgbaImage, rng: &mut impl Rng) -> AnimatorResult<RgbaImage> {
    let (w, h) = img.dimensions();
    let noised = add_noise(img, BACKGROUND_NOISE, rng)?;
    let padded = imageops::resize(
        &noised,
        w + BACKGROUND_PADDING * 2,
        h + BACKGROUND_PADDING * 2,
        FilterType::Lanczos3,
    );
    let blurred = gaussian_blur(&padded, BACKGROUND_BLUR_SIGMA)?;
    Ok(imageops::crop_imm(&blurred, BACKGROUND_PADDING, BACKGROUND_PADDING, w, h).to_image())
}

#[cfg(test)]
#[path = "../../tests/unit/transform/affine.rs"]
mod tests;
