use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::core::FrameIndex;

/// One parsed keyframe line.
///
/// Events are immutable once parsed. Several events may share a frame; their relative order
/// is the order they appeared in the source text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframeEvent {
    pub frame: FrameIndex,
    /// 1-based source line.
    pub line: usize,
    pub kind: EventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "args", rename_all = "snake_case")]
pub enum EventKind {
    /// Rates per second; the timeline converts them to per-frame deltas.
    Transform {
        zoom: f64,
        x_shift: f64,
        y_shift: f64,
        rotation: f64,
    },
    Perspective {
        corners: [(f64, f64); 4],
        unsharpen: f64,
    },
    Denoise(f64),
    CfgScale(f64),
    Noise(f64),
    Seed(SeedValue),
    Prompt {
        positive: String,
        negative: String,
    },
    /// Prompt and seed recovered from an image's embedded generation parameters.
    PromptFromFile {
        path: PathBuf,
        positive: String,
        negative: String,
        seed: Option<u64>,
    },
    Template {
        positive: String,
        negative: String,
    },
    Source(SourceSpec),
    Model {
        name: String,
    },
    ColorCorrectionSet,
    ColorCorrectionClear,
    Prop(Placement),
    StampSet {
        name: String,
        placement: Placement,
    },
    StampClear {
        name: String,
    },
    TextSet(TextBlockSpec),
    TextClear {
        name: String,
    },
    Debug(bool),
}

impl EventKind {
    /// Keyword used in keyframe text.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Transform { .. } => "transform",
            Self::Perspective { .. } => "perspective",
            Self::Denoise(_) => "denoise",
            Self::CfgScale(_) => "cfg_scale",
            Self::Noise(_) => "noise",
            Self::Seed(_) => "seed",
            Self::Prompt { .. } => "prompt",
            Self::PromptFromFile { .. } => "prompt_from_png",
            Self::Template { .. } => "template",
            Self::Source(_) => "source",
            Self::Model { .. } => "model",
            Self::ColorCorrectionSet => "col_set",
            Self::ColorCorrectionClear => "col_clear",
            Self::Prop(_) => "prop",
            Self::StampSet { .. } => "set_stamp",
            Self::StampClear { .. } => "clear_stamp",
            Self::TextSet(_) => "set_text",
            Self::TextClear { .. } => "clear_text",
            Self::Debug(_) => "debug",
        }
    }

    /// Whether the frame pipeline acts on this event while iterating frames.
    pub fn is_side_effect(&self) -> bool {
        matches!(
            self,
            Self::Model { .. }
                | Self::ColorCorrectionSet
                | Self::ColorCorrectionClear
                | Self::Prop(_)
                | Self::StampSet { .. }
                | Self::StampClear { .. }
                | Self::TextSet(_)
                | Self::TextClear { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedValue {
    Fixed(u64),
    /// `-1`: drawn when the timeline is built.
    Random,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpec {
    /// Glob matches, sorted.
    Images(Vec<PathBuf>),
    Video(PathBuf),
}

/// Where and how an image asset is pasted. `(x, y)` is the center of the pasted asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub asset: PathBuf,
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    /// Degrees, counter-clockwise.
    pub rotation: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextBlockSpec {
    pub name: String,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    pub background: Color,
    pub foreground: Color,
    pub font: PathBuf,
}
