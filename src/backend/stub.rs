use image::RgbaImage;
use rayon::prelude::*;

use super::{GenerationBackend, GenerationRequest};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::foundation::math::{Fnv1a64, clamp_u8, lerp};

/// One recorded backend interaction.
#[derive(Clone, Debug, PartialEq)]
pub enum StubCall {
    Generate {
        prompt: String,
        negative_prompt: String,
        seed: u64,
        subseed: Option<u64>,
        subseed_strength: Option<f64>,
        denoising_strength: f64,
        cfg_scale: f64,
        conditioned: bool,
    },
    LoadCheckpoint(String),
}

/// Deterministic procedural backend for tests and offline runs.
///
/// Frames are smooth gradients whose colors derive from the seed and prompt. Conditioning
/// images are kept in proportion to `1 - denoising_strength`, and only masked-in pixels
/// change when a mask is supplied.
#[derive(Clone, Debug)]
pub struct StubBackend {
    checkpoints: Vec<String>,
    active: Option<String>,
    calls: Vec<StubCall>,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl StubBackend {
    pub fn new(checkpoints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            checkpoints: checkpoints.into_iter().map(Into::into).collect(),
            active: None,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[StubCall] {
        &self.calls
    }

    pub fn active_checkpoint(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn generate_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StubCall::Generate { .. }))
            .count()
    }
}

#[derive(Clone, Copy)]
struct Pattern {
    from: [f64; 3],
    to: [f64; 3],
    angle: f64,
}

impl Pattern {
    fn new(seed: u64, prompt: &str, negative: &str) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_u64(seed);
        h.write_bytes(prompt.as_bytes());
        h.write_bytes(&[0]);
        h.write_bytes(negative.as_bytes());
        let bits = h.finish();
        let byte = |i: u32| f64::from(((bits >> (i * 8)) & 0xff) as u8);
        Self {
            from: [byte(0), byte(1), byte(2)],
            to: [byte(3), byte(4), byte(5)],
            angle: f64::from(((bits >> 48) & 0xffff) as u16) / 65535.0 * std::f64::consts::TAU,
        }
    }

    fn sample(&self, u: f64, v: f64) -> [f64; 3] {
        let t = ((u - 0.5) * self.angle.cos() + (v - 0.5) * self.angle.sin() + 0.5).clamp(0.0, 1.0);
        [
            lerp(self.from[0], self.to[0], t),
            lerp(self.from[1], self.to[1], t),
            lerp(self.from[2], self.to[2], t),
        ]
    }
}

impl GenerationBackend for StubBackend {
    fn generate(&mut self, req: &GenerationRequest) -> AnimatorResult<RgbaImage> {
        if req.width == 0 || req.height == 0 {
            return Err(AnimatorError::backend("requested an empty frame"));
        }
        self.calls.push(StubCall::Generate {
            prompt: req.prompt.clone(),
            negative_prompt: req.negative_prompt.clone(),
            seed: req.seed,
            subseed: req.subseed,
            subseed_strength: req.subseed_strength,
            denoising_strength: req.denoising_strength,
            cfg_scale: req.cfg_scale,
            conditioned: req.conditioning.is_some(),
        });

        let main = Pattern::new(req.seed, &req.prompt, &req.negative_prompt);
        let sub = match (req.subseed, req.subseed_strength) {
            (Some(s), Some(k)) if k > 0.0 => {
                Some((Pattern::new(s, &req.prompt, &req.negative_prompt), k.min(1.0)))
            }
            _ => None,
        };
        let (w, h) = (req.width, req.height);
        let cond = req
            .conditioning
            .as_ref()
            .map(|c| {
                if c.dimensions() == (w, h) {
                    c.clone()
                } else {
                    image::imageops::resize(c, w, h, image::imageops::FilterType::Triangle)
                }
            });
        let mask = req.mask.as_ref().filter(|m| m.dimensions() == (w, h));
        let keep = if cond.is_some() {
            (1.0 - req.denoising_strength).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let mut out = RgbaImage::new(w, h);
        out.par_chunks_mut(w as usize * 4)
            .enumerate()
            .for_each(|(y, row)| {
                let v = (y as f64 + 0.5) / f64::from(h);
                for x in 0..w as usize {
                    let u = (x as f64 + 0.5) / f64::from(w);
                    let mut px = main.sample(u, v);
                    if let Some((pat, k)) = &sub {
                        let other = pat.sample(u, v);
                        for c in 0..3 {
                            px[c] = lerp(px[c], other[c], *k);
                        }
                    }
                    let o = x * 4;
                    if let Some(cond) = &cond {
                        let cp = cond.get_pixel(x as u32, y as u32).0;
                        let masked_in = mask
                            .map(|m| m.get_pixel(x as u32, y as u32).0[0] >= 128)
                            .unwrap_or(true);
                        for c in 0..3 {
                            let base = f64::from(cp[c]);
                            px[c] = if masked_in { lerp(px[c], base, keep) } else { base };
                        }
                    }
                    row[o] = clamp_u8(px[0]);
                    row[o + 1] = clamp_u8(px[1]);
                    row[o + 2] = clamp_u8(px[2]);
                    row[o + 3] = 255;
                }
            });
        Ok(out)
    }

    fn load_checkpoint(&mut self, name: &str) -> AnimatorResult<()> {
        self.calls.push(StubCall::LoadCheckpoint(name.to_owned()));
        if !self.checkpoints.iter().any(|c| c == name) {
            return Err(AnimatorError::unknown_checkpoint(name));
        }
        tracing::info!(checkpoint = name, "checkpoint loaded");
        self.active = Some(name.to_owned());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/stub.rs"]
mod tests;
