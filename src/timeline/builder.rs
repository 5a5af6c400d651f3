use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::keyframes::{EventKind, KeyframeParser, ParsedKeyframes};
use crate::timeline::column::{FrameAxis, fill_polynomial_on};
use crate::timeline::prompts::{PromptKey, build_prompt_columns, compose_prompt};
use crate::timeline::seeds::build_seed_columns;

pub const TIMELINE_FILE_NAME: &str = "keyframes.json";

/// Resolved parameters for one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub frame: FrameIndex,
    /// Per-frame zoom factor (`1.0` = none).
    pub zoom: f64,
    /// Per-frame shift in pixels.
    pub x_shift: f64,
    pub y_shift: f64,
    /// Per-frame rotation in degrees.
    pub rotation: f64,
    /// Corner deltas `x0 y0 x1 y1 x2 y2 x3 y3`.
    pub perspective: [f64; 8],
    pub unsharpen: f64,
    pub denoise: f64,
    pub cfg_scale: f64,
    pub noise: f64,
    pub prompt_weight: f64,
    pub seed_start: u64,
    pub seed_end: Option<u64>,
    pub seed_strength: f64,
    pub pos1: String,
    pub neg1: String,
    pub pos2: String,
    pub neg2: String,
    pub positive_prompt: String,
    pub negative_prompt: String,
}

impl TimelineRow {
    pub fn has_affine(&self) -> bool {
        self.x_shift != 0.0 || self.y_shift != 0.0 || self.rotation != 0.0 || self.zoom != 1.0
    }

    pub fn has_perspective(&self) -> bool {
        self.perspective.iter().any(|&d| d != 0.0)
    }

    pub fn perspective_corners(&self) -> [(f64, f64); 4] {
        let p = &self.perspective;
        [(p[0], p[1]), (p[2], p[3]), (p[4], p[5]), (p[6], p[7])]
    }
}

/// Built once per run. Rows cover every frame of `0..=frame_count`, followed by one anchor
/// row per distinct frame that events past the end land on (plus the frame before each
/// prompt or seed anchor). Only the first `frame_count` rows are rendered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub frame_count: u64,
    pub rows: Vec<TimelineRow>,
}

/// Sparse numeric columns before filling.
struct SparseColumns {
    zoom: Vec<Option<f64>>,
    x_shift: Vec<Option<f64>>,
    y_shift: Vec<Option<f64>>,
    rotation: Vec<Option<f64>>,
    perspective: [Vec<Option<f64>>; 8],
    unsharpen: Vec<Option<f64>>,
    denoise: Vec<Option<f64>>,
    cfg_scale: Vec<Option<f64>>,
    noise: Vec<Option<f64>>,
}

impl SparseColumns {
    fn new(rows: usize, config: &RunConfig) -> Self {
        let col = |row0: f64| {
            let mut v = vec![None; rows];
            v[0] = Some(row0);
            v
        };
        Self {
            zoom: col(1.0),
            x_shift: col(0.0),
            y_shift: col(0.0),
            rotation: col(0.0),
            perspective: std::array::from_fn(|_| col(0.0)),
            unsharpen: col(0.0),
            denoise: col(config.denoising_strength),
            cfg_scale: col(config.cfg_scale),
            noise: col(config.noise_strength),
        }
    }
}

/// Frames past the end that need their own row: every event frame, and the frame before a
/// prompt or seed checkpoint, where the previous window or segment closes.
fn anchor_frames(parsed: &ParsedKeyframes, frame_count: u64) -> Vec<u64> {
    let mut anchors = Vec::new();
    for event in parsed.events.iter().filter(|e| e.frame.0 > frame_count) {
        anchors.push(event.frame.0);
        if matches!(
            event.kind,
            EventKind::Prompt { .. } | EventKind::PromptFromFile { .. } | EventKind::Seed(_)
        ) {
            anchors.push(event.frame.0 - 1);
        }
    }
    anchors
}

impl Timeline {
    /// Parse `config.keyframes` and build the table.
    pub fn from_config(config: &RunConfig, rng: &mut impl Rng) -> AnimatorResult<Self> {
        config.validate()?;
        let parsed = KeyframeParser::new(config.fps()?, config.total_time).parse(&config.keyframes);
        Self::build(&parsed, config, rng)
    }

    #[tracing::instrument(skip_all, fields(events = parsed.events.len()))]
    pub fn build(
        parsed: &ParsedKeyframes,
        config: &RunConfig,
        rng: &mut impl Rng,
    ) -> AnimatorResult<Self> {
        let fps = config.fps()?;
        let frame_count = fps.frame_count(config.total_time);
        usize::try_from(frame_count)
            .ok()
            .and_then(|r| r.checked_add(1))
            .ok_or_else(|| AnimatorError::validation("timeline is too long"))?;
        let axis = FrameAxis::with_anchors(frame_count, anchor_frames(parsed, frame_count));
        let rows = axis.len();

        let mut sparse = SparseColumns::new(rows, config);
        let mut seeds = Vec::new();
        let mut prompts = Vec::new();
        let mut template = (
            config.template_positive.clone(),
            config.template_negative.clone(),
        );

        let per_frame = fps.as_f64();
        for event in &parsed.events {
            let Some(row) = axis.row_of(event.frame.0) else {
                continue;
            };
            match &event.kind {
                EventKind::Transform {
                    zoom,
                    x_shift,
                    y_shift,
                    rotation,
                } => {
                    sparse.zoom[row] = Some(zoom.powf(1.0 / per_frame));
                    sparse.x_shift[row] = Some(x_shift / per_frame);
                    sparse.y_shift[row] = Some(y_shift / per_frame);
                    sparse.rotation[row] = Some(rotation / per_frame);
                }
                EventKind::Perspective { corners, unsharpen } => {
                    for (i, (x, y)) in corners.iter().enumerate() {
                        sparse.perspective[2 * i][row] = Some(*x);
                        sparse.perspective[2 * i + 1][row] = Some(*y);
                    }
                    sparse.unsharpen[row] = Some(*unsharpen);
                }
                EventKind::Denoise(v) => sparse.denoise[row] = Some(*v),
                EventKind::CfgScale(v) => sparse.cfg_scale[row] = Some(*v),
                EventKind::Noise(v) => sparse.noise[row] = Some(*v),
                EventKind::Seed(v) => seeds.push((row, *v)),
                EventKind::Prompt { positive, negative }
                | EventKind::PromptFromFile {
                    positive, negative, ..
                } => prompts.push(PromptKey {
                    row,
                    positive: positive.clone(),
                    negative: negative.clone(),
                }),
                EventKind::Template { positive, negative } => {
                    template = (positive.clone(), negative.clone());
                }
                _ => {}
            }
        }

        let fill = |col: &[Option<f64>]| fill_polynomial_on(&axis, col, 0.0);
        let zoom = fill(&sparse.zoom);
        let x_shift = fill(&sparse.x_shift);
        let y_shift = fill(&sparse.y_shift);
        let rotation = fill(&sparse.rotation);
        let perspective = sparse.perspective.each_ref().map(|c| fill(c));
        let unsharpen = fill(&sparse.unsharpen);
        let denoise = fill(&sparse.denoise);
        let cfg_scale = fill(&sparse.cfg_scale);
        let noise = fill(&sparse.noise);

        let seeds = build_seed_columns(&axis, &seeds, config.seed, config.seed_travel, rng);
        let prompt_cols = build_prompt_columns(&axis, &prompts);

        let (tmpl_pos, tmpl_neg) = template;
        let interpolate = config.prompt_interpolation;
        let rows = (0..rows)
            .map(|i| {
                let w = prompt_cols.weight[i];
                TimelineRow {
                    frame: FrameIndex(axis.frame(i)),
                    zoom: zoom[i],
                    x_shift: x_shift[i],
                    y_shift: y_shift[i],
                    rotation: rotation[i],
                    perspective: std::array::from_fn(|k| perspective[k][i]),
                    unsharpen: unsharpen[i],
                    denoise: denoise[i],
                    cfg_scale: cfg_scale[i],
                    noise: noise[i],
                    prompt_weight: w,
                    seed_start: seeds.start[i],
                    seed_end: seeds.end[i],
                    seed_strength: seeds.strength[i],
                    positive_prompt: compose_prompt(
                        &tmpl_pos,
                        &prompt_cols.pos1[i],
                        &prompt_cols.pos2[i],
                        w,
                        interpolate,
                    ),
                    negative_prompt: compose_prompt(
                        &tmpl_neg,
                        &prompt_cols.neg1[i],
                        &prompt_cols.neg2[i],
                        w,
                        interpolate,
                    ),
                    pos1: prompt_cols.pos1[i].clone(),
                    neg1: prompt_cols.neg1[i].clone(),
                    pos2: prompt_cols.pos2[i].clone(),
                    neg2: prompt_cols.neg2[i].clone(),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(frame_count, rows = rows.len(), "built timeline");
        Ok(Self { frame_count, rows })
    }

    pub fn row(&self, frame: FrameIndex) -> Option<&TimelineRow> {
        self.rows
            .binary_search_by_key(&frame, |r| r.frame)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Rows that are rendered.
    pub fn rendered_rows(&self) -> &[TimelineRow] {
        let n = (self.frame_count as usize).min(self.rows.len());
        &self.rows[..n]
    }

    pub fn to_json(&self) -> AnimatorResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AnimatorError::serde(format!("encode timeline: {e}")))
    }

    /// Write the table to `dir/keyframes.json`.
    pub fn persist(&self, dir: &Path) -> AnimatorResult<PathBuf> {
        let path = dir.join(TIMELINE_FILE_NAME);
        std::fs::write(&path, self.to_json()?)
            .with_context(|| format!("write timeline {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
