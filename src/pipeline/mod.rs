//! Per-frame animation loop.
//!
//! A run walks the timeline one frame at a time: replay side-effect keyframes, acquire a
//! source image, (loopback only) transform and color-correct it, call the generation
//! backend, composite overlays, morph from the previous frame, and persist. Frame `f + 1`
//! never starts before frame `f` has finished.

pub mod driver;
pub mod state;
pub mod writer;

pub use driver::{RunOutcome, RunReport, run, run_with_rng};
pub use state::InterruptFlag;
pub use writer::FrameWriter;
