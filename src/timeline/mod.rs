//! Dense per-frame parameter table built from sparse keyframe events.

pub mod builder;
pub mod column;
pub mod prompts;
pub mod seeds;

pub use builder::{TIMELINE_FILE_NAME, Timeline, TimelineRow};
