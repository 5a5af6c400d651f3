use image::RgbaImage;
use rand::Rng;

use crate::foundation::error::AnimatorResult;
use crate::transform::raster::{render_over, shape_to_cpu};

/// Scatter `floor(50 * strength)` randomly placed, randomly colored discs with a one-pixel
/// black outline over `img`. Disc diameters are drawn from `0..=floor(50 * strength)`.
pub fn add_noise(img: &RgbaImage, strength: f64, rng: &mut impl Rng) -> AnimatorResult<RgbaImage> {
    let count = (50.0 * strength).max(0.0) as u32;
    if count == 0 {
        return Ok(img.clone());
    }
    let (w, h) = img.dimensions();
    let discs = (0..count)
        .map(|_| {
            let x = f64::from(rng.gen_range(0..=w));
            let y = f64::from(rng.gen_range(0..=h));
            let s = f64::from(rng.gen_range(0..=count));
            let fill = [rng.r#gen::<u8>(), rng.r#gen::<u8>(), rng.r#gen::<u8>()];
            (x, y, s, fill)
        })
        .collect::<Vec<_>>();

    render_over(img, |ctx| {
        for (x, y, s, [r, g, b]) in discs {
            let outer = vello_cpu::kurbo::Ellipse::from_rect(vello_cpu::kurbo::Rect::new(
                x,
                y,
                x + s + 1.0,
                y + s + 1.0,
            ));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
            ctx.fill_path(&shape_to_cpu(&outer));
            if s >= 2.0 {
                let inner = vello_cpu::kurbo::Ellipse::from_rect(vello_cpu::kurbo::Rect::new(
                    x + 1.0,
                    y + 1.0,
                    x + s,
                    y + s,
                ));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, 255));
                ctx.fill_path(&shape_to_cpu(&inner));
            }
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/transform/noise.rs"]
mod tests;
