//! Auto-fitted text blocks drawn over rounded-rectangle backgrounds.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::color::Color;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::keyframes::TextBlockSpec;
use crate::transform::raster::{render_over, shape_to_cpu};

/// Inset between the block edge and the text, also used as the corner radius.
pub const TEXT_PADDING: u32 = 1;
/// Font sizes tried by auto-fit are `1..FIT_SIZE_LIMIT`.
pub const FIT_SIZE_LIMIT: u32 = 70;
/// Size used when no tried size overflows the block.
pub const DEFAULT_FONT_SIZE: u32 = 20;

/// RGBA8 brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Color> for TextBrush {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

#[derive(Clone)]
struct LoadedFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FitKey {
    text: String,
    font: PathBuf,
    w: u32,
    h: u32,
}

struct PreparedBlock {
    layout: parley::Layout<TextBrush>,
    font: vello_cpu::peniko::FontData,
    origin: (f64, f64),
    rect: vello_cpu::kurbo::RoundedRect,
    background: Color,
}

/// Shapes and paints text blocks. Fonts and fitted sizes are cached across frames.
pub struct TextRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    fonts: HashMap<PathBuf, Option<LoadedFont>>,
    fitted: HashMap<FitKey, u32>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("fonts", &self.fonts.len())
            .field("fitted", &self.fitted.len())
            .finish_non_exhaustive()
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: HashMap::new(),
            fitted: HashMap::new(),
        }
    }

    fn font(&mut self, path: &Path) -> Option<LoadedFont> {
        if let Some(cached) = self.fonts.get(path) {
            return cached.clone();
        }
        let loaded = match self.register_font(path) {
            Ok(f) => Some(f),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "font unavailable, skipping text block");
                None
            }
        };
        self.fonts.insert(path.to_path_buf(), loaded.clone());
        loaded
    }

    fn register_font(&mut self, path: &Path) -> AnimatorResult<LoadedFont> {
        let bytes = std::fs::read(path).with_context(|| format!("read font {}", path.display()))?;
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| AnimatorError::asset("no font families in font file"))?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| AnimatorError::asset("registered font family has no name"))?
            .to_string();
        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        Ok(LoadedFont { family, data })
    }

    fn layout(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
        brush: TextBrush,
    ) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family.to_owned())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Center,
            parley::AlignmentOptions::default(),
        );
        layout
    }

    /// Rendered `(width, height)` of `text` at `size_px`, or `None` if the font is unusable.
    pub fn measure(&mut self, text: &str, font: &Path, size_px: f32) -> Option<(f32, f32)> {
        let loaded = self.font(font)?;
        let layout = self.layout(text, &loaded.family, size_px, TextBrush::default());
        Some((layout.width(), layout.height()))
    }

    /// Largest tried size whose layout still fits `max_w` x `max_h`.
    ///
    /// Sizes grow from 1; the size before the first overflow wins, so text that overflows
    /// even at size 1 gets 0 and is not drawn. Text that never overflows gets
    /// [`DEFAULT_FONT_SIZE`].
    pub fn fit_size(&mut self, text: &str, font: &Path, max_w: f32, max_h: f32) -> Option<u32> {
        let loaded = self.font(font)?;
        for size in 1..FIT_SIZE_LIMIT {
            let layout = self.layout(text, &loaded.family, size as f32, TextBrush::default());
            if layout.width() > max_w || layout.height() > max_h {
                return Some(size - 1);
            }
        }
        Some(DEFAULT_FONT_SIZE)
    }

    fn prepare(&mut self, spec: &TextBlockSpec) -> Option<PreparedBlock> {
        let loaded = self.font(&spec.font)?;
        let pad = TEXT_PADDING as f32;
        let key = FitKey {
            text: spec.text.clone(),
            font: spec.font.clone(),
            w: spec.w,
            h: spec.h,
        };
        let size = match self.fitted.get(&key) {
            Some(&s) => s,
            None => {
                let s = self.fit_size(
                    &spec.text,
                    &spec.font,
                    spec.w as f32 - 2.0 * pad,
                    spec.h as f32 - 2.0 * pad,
                )?;
                tracing::debug!(name = %spec.name, size = s, "fitted text block");
                self.fitted.insert(key, s);
                s
            }
        };

        let (x, y) = (f64::from(spec.x), f64::from(spec.y));
        let (w, h) = (f64::from(spec.w), f64::from(spec.h));
        let pad = f64::from(TEXT_PADDING);
        let rect = vello_cpu::kurbo::RoundedRect::new(x, y, x + w, y + h, pad);
        // Size 0 means nothing fits; only the background is drawn.
        let text = if size == 0 { "" } else { spec.text.as_str() };
        let layout = self.layout(text, &loaded.family, size.max(1) as f32, spec.foreground.into());
        let text_h = f64::from(layout.height());
        let origin = (x + pad, y + pad + (h - text_h) / 2.0);

        Some(PreparedBlock {
            layout,
            font: loaded.data,
            origin,
            rect,
            background: spec.background,
        })
    }

    /// Draw `blocks` over `frame` in order. Blocks whose font cannot be loaded are skipped.
    pub fn draw_blocks(
        &mut self,
        frame: &RgbaImage,
        blocks: &[TextBlockSpec],
    ) -> AnimatorResult<RgbaImage> {
        let prepared = blocks
            .iter()
            .filter_map(|b| self.prepare(b))
            .collect::<Vec<_>>();
        if prepared.is_empty() {
            return Ok(frame.clone());
        }

        render_over(frame, |ctx| {
            for block in &prepared {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(block.background.to_peniko());
                ctx.fill_path(&shape_to_cpu(&block.rect));

                ctx.set_transform(vello_cpu::kurbo::Affine::translate(block.origin));
                for line in block.layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));
                        let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&block.font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/text.rs"]
mod tests;
