//! Props, stamps and text blocks composited over generated frames.
//!
//! Image layers are alpha-composited in registration order (props first, then stamps);
//! text blocks are drawn last.

pub mod paste;
pub mod registry;
pub mod text;

use std::path::PathBuf;

use image::RgbaImage;

use crate::foundation::error::AnimatorResult;
use crate::keyframes::EventKind;

pub use paste::{AssetCache, paste_layers, placement_affine};
pub use registry::OverlayRegistry;
pub use text::{TextBrush, TextRenderer};

/// Overlay state owned by one pipeline run.
#[derive(Debug)]
pub struct OverlayCompositor {
    registry: OverlayRegistry,
    assets: AssetCache,
    text: TextRenderer,
}

impl OverlayCompositor {
    pub fn new(prop_folder: impl Into<PathBuf>) -> Self {
        Self {
            registry: OverlayRegistry::new(),
            assets: AssetCache::new(prop_folder),
            text: TextRenderer::new(),
        }
    }

    /// Forward an overlay event to the registry. Returns `false` for other event kinds.
    pub fn apply(&mut self, kind: &EventKind) -> bool {
        self.registry.apply(kind)
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    /// Composite every active overlay over `frame`, then drop the one-shot props.
    pub fn composite(&mut self, frame: &RgbaImage) -> AnimatorResult<RgbaImage> {
        if self.registry.is_empty() {
            return Ok(frame.clone());
        }
        let layered = paste_layers(frame, self.registry.image_layers(), &mut self.assets)?;
        let out = if self.registry.text_blocks().is_empty() {
            layered
        } else {
            self.text.draw_blocks(&layered, self.registry.text_blocks())?
        };
        self.registry.clear_props();
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/mod.rs"]
mod tests;
