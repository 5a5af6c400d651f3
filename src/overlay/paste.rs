use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::AnimatorResult;
use crate::keyframes::Placement;
use crate::transform::raster::{affine_to_cpu, image_paint, render_over};

/// Decoded prop and stamp images, keyed by resolved path.
///
/// Relative asset paths resolve against the prop folder. Files that fail to load are
/// remembered as missing so the warning is emitted once per asset.
#[derive(Debug)]
pub struct AssetCache {
    root: PathBuf,
    images: HashMap<PathBuf, Option<RgbaImage>>,
}

impl AssetCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: HashMap::new(),
        }
    }

    pub fn resolve(&self, asset: &Path) -> PathBuf {
        if asset.is_absolute() {
            asset.to_path_buf()
        } else {
            self.root.join(asset)
        }
    }

    /// Decoded image for `asset`, or `None` when it cannot be read.
    pub fn get(&mut self, asset: &Path) -> Option<&RgbaImage> {
        let path = self.resolve(asset);
        self.images
            .entry(path)
            .or_insert_with_key(|path| match load_rgba(path) {
                Ok(img) => Some(img),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "overlay asset unavailable, skipping");
                    None
                }
            })
            .as_ref()
    }
}

fn load_rgba(path: &Path) -> AnimatorResult<RgbaImage> {
    let img = image::open(path).with_context(|| format!("decode {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// Placement transform: the asset is scaled, rotated counter-clockwise by `rotation`
/// degrees, and centered on `(x, y)`.
pub fn placement_affine(p: &Placement, asset_w: u32, asset_h: u32) -> kurbo::Affine {
    kurbo::Affine::translate((f64::from(p.x), f64::from(p.y)))
        * kurbo::Affine::rotate(-p.rotation.to_radians())
        * kurbo::Affine::scale(p.scale)
        * kurbo::Affine::translate((-f64::from(asset_w) / 2.0, -f64::from(asset_h) / 2.0))
}

/// Alpha-composite each placement over `frame` in order. Missing assets are skipped.
pub fn paste_layers<'a>(
    frame: &RgbaImage,
    layers: impl IntoIterator<Item = &'a Placement>,
    assets: &mut AssetCache,
) -> AnimatorResult<RgbaImage> {
    let mut resolved = Vec::new();
    for p in layers {
        if p.scale <= 0.0 || !p.scale.is_finite() {
            tracing::warn!(asset = %p.asset.display(), scale = p.scale, "overlay scale must be > 0, skipping");
            continue;
        }
        if let Some(img) = assets.get(&p.asset) {
            let paint = image_paint(img)?;
            let xf = placement_affine(p, img.width(), img.height());
            resolved.push((paint, xf, img.width(), img.height()));
        }
    }
    if resolved.is_empty() {
        return Ok(frame.clone());
    }

    render_over(frame, |ctx| {
        for (paint, xf, w, h) in resolved {
            ctx.set_transform(affine_to_cpu(xf));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(w),
                f64::from(h),
            ));
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/paste.rs"]
mod tests;
