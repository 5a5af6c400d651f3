//! Keyframe timeline engine and frame pipeline for parametric generative-image animation.
//!
//! A run takes a sparse, hand-written keyframe script and a [`RunConfig`]:
//!
//! - [`KeyframeParser`] turns the script into ordered [`KeyframeEvent`]s
//! - [`Timeline::build`] resolves them into a dense per-frame parameter table
//! - [`pipeline::run`] walks the table, drives a [`GenerationBackend`], composites overlays,
//!   smooths between frames and writes `frame_NNNNN.png` files
#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod effects;
pub mod export;
pub mod foundation;
pub mod keyframes;
pub mod overlay;
pub mod pipeline;
pub mod source;
pub mod timeline;
pub mod transform;

pub use crate::backend::{GenerationBackend, GenerationRequest, StubBackend};
pub use crate::config::{InitialImage, OutputToggles, RunConfig};
pub use crate::foundation::color::Color;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, frame_file_name};
pub use crate::foundation::error::{AnimatorError, AnimatorResult};
pub use crate::keyframes::{EventKind, KeyframeEvent, KeyframeParser, ParsedKeyframes};
pub use crate::pipeline::{InterruptFlag, RunOutcome, RunReport};
pub use crate::timeline::{Timeline, TimelineRow};
