//! Boundary to the image-generation backend.
//!
//! The pipeline treats generation as an opaque, blocking call from a [`GenerationRequest`]
//! to an image, plus a side-effecting checkpoint swap keyed by name.

pub mod stub;

use image::{GrayImage, RgbaImage};

use crate::foundation::error::AnimatorResult;

pub use stub::{StubBackend, StubCall};

/// Everything the backend needs to produce one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    /// Image conditioning (img2img); `None` generates from noise.
    pub conditioning: Option<RgbaImage>,
    /// Inpainting mask; white pixels are regenerated.
    pub mask: Option<GrayImage>,
    pub prompt: String,
    pub negative_prompt: String,
    pub seed: u64,
    pub subseed: Option<u64>,
    pub subseed_strength: Option<f64>,
    pub denoising_strength: f64,
    pub steps: u32,
    pub cfg_scale: f64,
    pub sampler: String,
    pub width: u32,
    pub height: u32,
    pub restore_faces: bool,
}

/// Image generator driven by the frame pipeline.
///
/// Implementations must be deterministic for identical requests. Calls are made one at a
/// time from the pipeline thread and may block for as long as generation takes.
pub trait GenerationBackend {
    /// Generate one frame of `req.width` x `req.height` pixels.
    fn generate(&mut self, req: &GenerationRequest) -> AnimatorResult<RgbaImage>;

    /// Switch the active model checkpoint. Unknown names must fail with
    /// [`crate::AnimatorError::UnknownCheckpoint`].
    fn load_checkpoint(&mut self, name: &str) -> AnimatorResult<()>;
}

impl<B: GenerationBackend + ?Sized> GenerationBackend for Box<B> {
    fn generate(&mut self, req: &GenerationRequest) -> AnimatorResult<RgbaImage> {
        (**self).generate(req)
    }

    fn load_checkpoint(&mut self, name: &str) -> AnimatorResult<()> {
        (**self).load_checkpoint(name)
    }
}
