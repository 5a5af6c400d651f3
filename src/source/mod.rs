//! External frame sources: image sequences and (with `media-ffmpeg`) video files.

pub mod video;

use std::path::PathBuf;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::keyframes::SourceSpec;

pub use video::VideoInfo;

#[derive(Clone, Debug)]
enum Backing {
    Images(Vec<PathBuf>),
    Video(VideoInfo),
}

/// Per-frame reader over an external source, resized to the run canvas.
///
/// Once the source runs out the last decoded frame is repeated for every later request.
#[derive(Debug)]
pub struct FrameSource {
    backing: Backing,
    canvas: Canvas,
    last: Option<RgbaImage>,
    exhausted_at: Option<FrameIndex>,
}

impl FrameSource {
    pub fn open(spec: &SourceSpec, canvas: Canvas) -> AnimatorResult<Self> {
        let backing = match spec {
            SourceSpec::Images(paths) => {
                if paths.is_empty() {
                    return Err(AnimatorError::validation(
                        "image source matched no files",
                    ));
                }
                Backing::Images(paths.clone())
            }
            SourceSpec::Video(path) => Backing::Video(video::probe(path)?),
        };
        Ok(Self {
            backing,
            canvas,
            last: None,
            exhausted_at: None,
        })
    }

    /// Number of frames known up front, if any.
    pub fn len_hint(&self) -> Option<usize> {
        match &self.backing {
            Backing::Images(paths) => Some(paths.len()),
            Backing::Video(_) => None,
        }
    }

    pub fn exhausted_at(&self) -> Option<FrameIndex> {
        self.exhausted_at
    }

    /// Source frame `frame`, or the last available one once the source is exhausted.
    pub fn frame(&mut self, frame: FrameIndex) -> AnimatorResult<RgbaImage> {
        if self.exhausted_at.is_none() {
            match self.decode(frame)? {
                Some(img) => {
                    let img = self.fit(img);
                    self.last = Some(img.clone());
                    return Ok(img);
                }
                None => {
                    tracing::warn!(frame = %frame, "external source exhausted, holding last frame");
                    self.exhausted_at = Some(frame);
                }
            }
        }
        self.last
            .clone()
            .ok_or_else(|| AnimatorError::asset("external source produced no frames"))
    }

    fn decode(&self, frame: FrameIndex) -> AnimatorResult<Option<RgbaImage>> {
        match &self.backing {
            Backing::Images(paths) => {
                let Some(path) = paths.get(frame.as_usize()) else {
                    return Ok(None);
                };
                let img = image::open(path)
                    .with_context(|| format!("decode source frame {}", path.display()))?;
                Ok(Some(img.to_rgba8()))
            }
            Backing::Video(info) => video::decode_frame(info, frame.0),
        }
    }

    fn fit(&self, img: RgbaImage) -> RgbaImage {
        if img.dimensions() == (self.canvas.width, self.canvas.height) {
            return img;
        }
        image::imageops::resize(
            &img,
            self.canvas.width,
            self.canvas.height,
            image::imageops::FilterType::Lanczos3,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/mod.rs"]
mod tests;
