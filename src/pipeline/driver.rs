use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{GrayImage, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::state::{InterruptFlag, RunState};
use super::writer::FrameWriter;
use crate::backend::{GenerationBackend, GenerationRequest};
use crate::config::{InitialImage, RunConfig};
use crate::effects::morph;
use crate::export;
use crate::foundation::core::{Canvas, Fps, FrameIndex, debug_file_name, frame_file_name};
use crate::foundation::error::AnimatorResult;
use crate::keyframes::{EventKind, KeyframeParser, ParsedKeyframes, RunDirectives};
use crate::overlay::OverlayCompositor;
use crate::source::FrameSource;
use crate::timeline::{Timeline, TimelineRow};
use crate::transform::{ColorReference, add_noise, perspective_warp, transform_frame};

const WRITE_QUEUE_DEPTH: usize = 4;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// Stopped before rendering `at_frame`; earlier frames are on disk.
    Interrupted { at_frame: FrameIndex },
}

/// Summary of a finished (or interrupted) run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub output_dir: PathBuf,
    /// Frames the timeline asked for.
    pub frame_count: u64,
    /// Timeline frames actually rendered and persisted.
    pub frames_rendered: u64,
    /// Every file persisted by the frame writer (frames, smoothing frames and debug
    /// artifacts), in write order. External interpolation replaces these frames on disk.
    pub files_written: Vec<PathBuf>,
    pub outcome: RunOutcome,
    /// Rate the encoder scripts and videos use for the frames left on disk.
    pub playback_fps: f64,
    /// Published frames at every multiple of `floor(fps)`.
    pub previews: Vec<(FrameIndex, RgbaImage)>,
    pub videos: Vec<PathBuf>,
}

/// Run the frame pipeline with a fresh entropy-seeded RNG.
///
/// See [`run_with_rng`].
pub fn run(
    config: &RunConfig,
    backend: &mut dyn GenerationBackend,
    interrupt: &InterruptFlag,
) -> AnimatorResult<RunReport> {
    run_with_rng(config, backend, interrupt, &mut StdRng::from_entropy())
}

/// Render every frame of `config` into `config.output_dir`.
///
/// `settings.json` is written whether or not the run succeeds. Frames already persisted stay
/// on disk after an interrupt or an error.
#[tracing::instrument(skip_all, fields(output_dir = %config.output_dir.display()))]
pub fn run_with_rng(
    config: &RunConfig,
    backend: &mut dyn GenerationBackend,
    interrupt: &InterruptFlag,
    rng: &mut impl Rng,
) -> AnimatorResult<RunReport> {
    let dir = config.output_dir.clone();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create output directory {}", dir.display()))?;

    let result = execute(config, &dir, backend, interrupt, rng);
    match (config.save_settings(&dir), result) {
        (Ok(_), result) => result,
        (Err(save_err), Ok(_)) => Err(save_err),
        (Err(save_err), Err(run_err)) => {
            tracing::warn!(error = %save_err, "failed to persist settings after run failure");
            Err(run_err)
        }
    }
}

fn execute(
    config: &RunConfig,
    dir: &Path,
    backend: &mut dyn GenerationBackend,
    interrupt: &InterruptFlag,
    rng: &mut impl Rng,
) -> AnimatorResult<RunReport> {
    config.validate()?;
    let fps = config.fps()?;
    let canvas = config.canvas()?;

    let parsed = KeyframeParser::new(fps, config.total_time).parse(&config.keyframes);
    let directives = parsed.directives();
    let timeline = Timeline::build(&parsed, config, rng)?;
    timeline.persist(dir)?;

    // Rate of the frames the loop itself writes; external interpolation may raise it later.
    let morph_smoothing = if config.film_interpolation {
        0
    } else {
        config.smoothing
    };
    let mut playback_fps = export::final_fps(fps.as_f64(), morph_smoothing, false);
    export::write_encode_scripts(dir, playback_fps)?;
    if config.film_interpolation
        && let Some(command) = &config.film_command
        && let Err(err) = export::write_film_script(dir, command, config.smoothing)
    {
        tracing::warn!(error = %err, "could not write the interpolator script");
    }

    let source = match &directives.source {
        Some(spec) => Some(FrameSource::open(spec, canvas)?),
        None => None,
    };
    let initial = match (&config.initial_image, config.loopback) {
        (Some(path), true) => Some(fit_initial(
            InitialImage::load(path, config.mask.as_deref())?,
            canvas,
        )),
        _ => None,
    };

    tracing::info!(
        frames = timeline.frame_count,
        loopback = config.loopback,
        smoothing = config.smoothing,
        skipped_lines = parsed.skipped.len(),
        "starting run"
    );

    let mut driver = FrameDriver {
        config,
        dir,
        canvas,
        parsed: &parsed,
        directives,
        backend,
        source,
        initial,
        overlays: OverlayCompositor::new(&config.prop_folder),
        state: RunState::default(),
        writer: FrameWriter::new(WRITE_QUEUE_DEPTH),
        previews: Vec::new(),
        preview_stride: fps.preview_stride(),
    };

    let mut outcome = RunOutcome::Completed;
    let mut frames_rendered = 0;
    for row in timeline.rendered_rows() {
        if interrupt.is_requested() {
            tracing::info!(frame = %row.frame, "interrupt requested, stopping");
            outcome = RunOutcome::Interrupted { at_frame: row.frame };
            break;
        }
        driver.step(row, rng)?;
        frames_rendered += 1;
    }

    let FrameDriver {
        writer, previews, ..
    } = driver;
    let files_written = writer.finish()?;

    if outcome == RunOutcome::Completed
        && config.film_interpolation
        && config.smoothing > 0
        && let Some(rate) = film_interpolate(config, dir, fps)
    {
        playback_fps = rate;
        export::write_encode_scripts(dir, playback_fps)?;
    }

    let videos = if outcome == RunOutcome::Completed {
        match export::encode_videos(dir, playback_fps, &config.output) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(error = %err, "video encoding failed");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    tracing::info!(frames_rendered, files = files_written.len(), ?outcome, "run finished");
    Ok(RunReport {
        output_dir: dir.to_path_buf(),
        frame_count: timeline.frame_count,
        frames_rendered,
        files_written,
        outcome,
        playback_fps,
        previews,
        videos,
    })
}

/// Run the configured interpolator; returns the new playback rate when it succeeded.
fn film_interpolate(config: &RunConfig, dir: &Path, fps: Fps) -> Option<f64> {
    let Some(command) = &config.film_command else {
        tracing::warn!("film_interpolation is set without a film_command, frames keep the base rate");
        return None;
    };
    match export::interpolate_frames(dir, command, config.smoothing) {
        Ok(_) => Some(export::final_fps(fps.as_f64(), config.smoothing, true)),
        Err(err) => {
            tracing::warn!(error = %err, "frame interpolation failed, frames keep the base rate");
            None
        }
    }
}

fn fit_initial(mut initial: InitialImage, canvas: Canvas) -> InitialImage {
    let (w, h) = (canvas.width, canvas.height);
    if initial.image.dimensions() != (w, h) {
        initial.image =
            image::imageops::resize(&initial.image, w, h, image::imageops::FilterType::Lanczos3);
    }
    if let Some(mask) = initial.mask.as_mut()
        && mask.dimensions() != (w, h)
    {
        *mask = image::imageops::resize(mask, w, h, image::imageops::FilterType::Lanczos3);
    }
    initial
}

struct FrameDriver<'a> {
    config: &'a RunConfig,
    dir: &'a Path,
    canvas: Canvas,
    parsed: &'a ParsedKeyframes,
    directives: RunDirectives,
    backend: &'a mut dyn GenerationBackend,
    source: Option<FrameSource>,
    initial: Option<InitialImage>,
    overlays: OverlayCompositor,
    state: RunState,
    writer: FrameWriter,
    previews: Vec<(FrameIndex, RgbaImage)>,
    preview_stride: u64,
}

impl FrameDriver<'_> {
    fn step(&mut self, row: &TimelineRow, rng: &mut impl Rng) -> AnimatorResult<()> {
        let frame = row.frame;
        tracing::debug!(frame = %frame, prompt = %row.positive_prompt, seed = row.seed_start, "frame");

        let recapture = self.apply_events(frame)?;

        let raw = if self.config.loopback {
            self.loopback_generate(row, recapture, rng)?
        } else {
            let conditioning = match self.source.as_mut() {
                Some(src) => Some(src.frame(frame)?),
                None => None,
            };
            self.generate(row, conditioning, None)?
        };

        let published = self.overlays.composite(&raw)?;
        self.publish(frame, published)?;
        self.state.last_raw = Some(raw);
        Ok(())
    }

    /// Replay side-effect events scheduled at `frame`. Returns whether the color reference
    /// must be re-captured.
    fn apply_events(&mut self, frame: FrameIndex) -> AnimatorResult<bool> {
        let parsed = self.parsed;
        let mut recapture = false;
        for event in parsed.events_at(frame) {
            match &event.kind {
                EventKind::Model { name } => {
                    tracing::info!(frame = %frame, checkpoint = %name, "switching checkpoint");
                    self.backend.load_checkpoint(name)?;
                }
                EventKind::ColorCorrectionSet => {
                    self.state.color_correction = true;
                    recapture = frame.0 > 0;
                }
                EventKind::ColorCorrectionClear => self.state.color_correction = false,
                kind => {
                    self.overlays.apply(kind);
                }
            }
        }
        Ok(recapture)
    }

    fn loopback_generate(
        &mut self,
        row: &TimelineRow,
        recapture: bool,
        rng: &mut impl Rng,
    ) -> AnimatorResult<RgbaImage> {
        let frame = row.frame;
        let last = self.state.last_raw.take();
        let mut init = if let Some(src) = self.source.as_mut() {
            src.frame(frame)?
        } else if let Some(last) = last.filter(|_| frame.0 > 0) {
            last
        } else if let Some(initial) = self.initial.as_ref().filter(|_| frame.0 == 0) {
            initial.image.clone()
        } else {
            self.generate(row, None, None)?
        };

        if frame.0 == 0 || recapture {
            self.state.color_reference = Some(ColorReference::capture(&init));
        }

        let (dx, dy) = self.state.take_shift(row.x_shift, row.y_shift);
        if row.has_affine() {
            init = transform_frame(&init, row.rotation, dx, dy, row.zoom, rng)?;
        }
        if row.has_perspective() {
            init = perspective_warp(&init, row.perspective_corners(), row.unsharpen)?;
        }
        if self.config.add_noise {
            init = add_noise(&init, row.noise, rng)?;
        }
        let mask = self.initial.as_ref().and_then(|i| i.mask.clone());
        if self.state.color_correction
            && let Some(reference) = &self.state.color_reference
        {
            init = reference.apply(&init, mask.as_ref());
        }

        let index = self.state.frame_save;
        if self.directives.debug {
            self.writer
                .write(self.dir.join(debug_file_name(index, 'a')), init.clone())?;
        }
        let raw = self.generate(row, Some(init), mask)?;
        if self.directives.debug {
            self.writer
                .write(self.dir.join(debug_file_name(index, 'b')), raw.clone())?;
        }
        Ok(raw)
    }

    fn generate(
        &mut self,
        row: &TimelineRow,
        conditioning: Option<RgbaImage>,
        mask: Option<GrayImage>,
    ) -> AnimatorResult<RgbaImage> {
        let req = GenerationRequest {
            conditioning,
            mask,
            prompt: row.positive_prompt.clone(),
            negative_prompt: row.negative_prompt.clone(),
            seed: row.seed_start,
            subseed: row.seed_end,
            subseed_strength: row.seed_end.map(|_| row.seed_strength),
            denoising_strength: row.denoise,
            steps: self.config.steps,
            cfg_scale: row.cfg_scale,
            sampler: self.config.sampler.clone(),
            width: self.canvas.width,
            height: self.canvas.height,
            restore_faces: self.config.restore_faces,
        };
        let mut img = self.backend.generate(&req)?;
        if img.dimensions() != (self.canvas.width, self.canvas.height) {
            img = image::imageops::resize(
                &img,
                self.canvas.width,
                self.canvas.height,
                image::imageops::FilterType::Lanczos3,
            );
        }
        Ok(img)
    }

    /// Persist smoothing frames and the published frame, then remember it for the next
    /// morph.
    fn publish(&mut self, frame: FrameIndex, published: RgbaImage) -> AnimatorResult<()> {
        if self.config.smoothing > 0
            && !self.config.film_interpolation
            && let Some(prev) = &self.state.last_published
        {
            for img in morph(prev, &published, self.config.smoothing)? {
                let index = self.state.next_frame_index();
                self.writer.write(self.dir.join(frame_file_name(index)), img)?;
            }
        }

        if frame.0 % self.preview_stride == 0 {
            self.previews.push((frame, published.clone()));
        }

        let index = self.state.next_frame_index();
        self.writer
            .write(self.dir.join(frame_file_name(index)), published.clone())?;
        self.state.last_published = Some(published);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/driver.rs"]
mod tests;
