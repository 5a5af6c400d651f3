//! Run parameters supplied once per animation run.
//!
//! [`RunConfig`] is a plain serde value: it is loaded from JSON, validated, handed by
//! reference to the timeline builder and the frame pipeline, and written back next to the
//! rendered frames as `settings.json`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{AnimatorError, AnimatorResult};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Which video containers to encode once frames are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputToggles {
    pub gif: bool,
    pub mp4: bool,
    pub webm: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub steps: u32,
    pub sampler: String,
    pub width: u32,
    pub height: u32,
    pub cfg_scale: f64,
    pub denoising_strength: f64,
    /// Seconds of animation.
    pub total_time: f64,
    pub fps: f64,
    /// Intermediate frames synthesized between consecutive rendered frames.
    pub smoothing: u32,
    /// Smoothing is delegated to an external frame interpolator instead of morphing.
    pub film_interpolation: bool,
    /// Interpolator run as `film_command <run dir> <smoothing>` after a completed run.
    pub film_command: Option<PathBuf>,
    pub add_noise: bool,
    pub noise_strength: f64,
    /// Base seed; `-1` draws a random seed when the timeline is built.
    pub seed: i64,
    pub seed_travel: bool,
    pub restore_faces: bool,
    pub initial_image: Option<PathBuf>,
    pub mask: Option<PathBuf>,
    pub loopback: bool,
    pub prompt_interpolation: bool,
    pub template_positive: String,
    pub template_negative: String,
    /// Keyframe mini-language source text.
    pub keyframes: String,
    pub output: OutputToggles,
    pub output_dir: PathBuf,
    /// Root folder for prop and stamp assets.
    pub prop_folder: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 20,
            sampler: "Euler a".to_owned(),
            width: 512,
            height: 512,
            cfg_scale: 7.0,
            denoising_strength: 0.4,
            total_time: 10.0,
            fps: 15.0,
            smoothing: 0,
            film_interpolation: false,
            film_command: None,
            add_noise: false,
            noise_strength: 0.0,
            seed: -1,
            seed_travel: false,
            restore_faces: false,
            initial_image: None,
            mask: None,
            loopback: true,
            prompt_interpolation: true,
            template_positive: String::new(),
            template_negative: String::new(),
            keyframes: String::new(),
            output: OutputToggles::default(),
            output_dir: PathBuf::from("animator_output"),
            prop_folder: PathBuf::from("props"),
        }
    }
}

impl RunConfig {
    pub fn from_path(path: impl AsRef<Path>) -> AnimatorResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read run config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&s).map_err(|e| {
            AnimatorError::serde(format!("parse run config {}: {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AnimatorResult<()> {
        Fps::new(self.fps)?;
        if !self.total_time.is_finite() || self.total_time <= 0.0 {
            return Err(AnimatorError::validation(
                "total_time must be finite and > 0",
            ));
        }
        Canvas::new(self.width, self.height)?;
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(AnimatorError::validation(
                "canvas width/height must fit in u16",
            ));
        }
        if self.steps == 0 {
            return Err(AnimatorError::validation("steps must be > 0"));
        }
        for (name, v) in [
            ("cfg_scale", self.cfg_scale),
            ("denoising_strength", self.denoising_strength),
            ("noise_strength", self.noise_strength),
        ] {
            if !v.is_finite() {
                return Err(AnimatorError::validation(format!("{name} must be finite")));
            }
        }
        if self.seed < -1 || self.seed > i64::from(u32::MAX) {
            return Err(AnimatorError::validation(
                "seed must be -1 or within 0..=4294967295",
            ));
        }
        if self.mask.is_some() && self.initial_image.is_none() {
            return Err(AnimatorError::validation(
                "mask requires an initial_image",
            ));
        }
        Ok(())
    }

    pub fn fps(&self) -> AnimatorResult<Fps> {
        Fps::new(self.fps)
    }

    pub fn canvas(&self) -> AnimatorResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    /// Number of frames the pipeline renders.
    pub fn frame_count(&self) -> AnimatorResult<u64> {
        Ok(self.fps()?.frame_count(self.total_time))
    }

    /// Write the settings used for this run into `dir` as pretty JSON.
    pub fn save_settings(&self, dir: &Path) -> AnimatorResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir {}", dir.display()))?;
        let path = dir.join(SETTINGS_FILE_NAME);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnimatorError::serde(format!("encode settings: {e}")))?;
        std::fs::write(&path, json)
            .with_context(|| format!("write settings {}", path.display()))?;
        Ok(path)
    }
}

/// Initial loopback image plus the effective inpainting mask.
#[derive(Clone, Debug)]
pub struct InitialImage {
    /// Opaque copy of the supplied image.
    pub image: RgbaImage,
    pub mask: Option<GrayImage>,
}

impl InitialImage {
    /// Load the initial image and optional mask from disk.
    ///
    /// A mask without a single non-zero pixel counts as absent. Otherwise transparent parts
    /// of the image are added to the mask.
    pub fn load(image_path: &Path, mask_path: Option<&Path>) -> AnimatorResult<Self> {
        let image = image::open(image_path)
            .with_context(|| format!("decode initial image {}", image_path.display()))?
            .to_rgba8();
        let mask = match mask_path {
            Some(p) => Some(
                image::open(p)
                    .with_context(|| format!("decode mask {}", p.display()))?
                    .to_luma8(),
            ),
            None => None,
        };
        Ok(Self::prepare(image, mask))
    }

    pub fn prepare(image: RgbaImage, mask: Option<GrayImage>) -> Self {
        let mask = mask
            .filter(|m| m.pixels().any(|p| p.0[0] > 0))
            .map(|m| merge_alpha_into_mask(&image, &m));

        let mut flat = image;
        for px in flat.pixels_mut() {
            px.0[3] = 255;
        }
        Self { image: flat, mask }
    }
}

fn merge_alpha_into_mask(image: &RgbaImage, mask: &GrayImage) -> GrayImage {
    let mask = if mask.dimensions() == image.dimensions() {
        mask.clone()
    } else {
        image::imageops::resize(
            mask,
            image.width(),
            image.height(),
            image::imageops::FilterType::Nearest,
        )
    };
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let holes = if image.get_pixel(x, y).0[3] < 255 {
            255
        } else {
            0
        };
        image::Luma([mask.get_pixel(x, y).0[0].max(holes)])
    })
}

#[cfg(test)]
#[path = "../../tests/unit/config/mod.rs"]
mod tests;
