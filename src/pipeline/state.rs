use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbaImage;

use crate::transform::ColorReference;

/// Cooperative cancellation token for a run.
///
/// Clones share the flag. The pipeline polls it before each frame; a backend call already in
/// flight finishes first.
#[derive(Clone, Debug, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Mutable state carried from one frame to the next within a single run.
#[derive(Debug)]
pub(crate) struct RunState {
    shift_remainder: (f64, f64),
    /// Raw backend output of the previous frame; loopback conditioning.
    pub(crate) last_raw: Option<RgbaImage>,
    /// Previous published frame; start point for morphing.
    pub(crate) last_published: Option<RgbaImage>,
    pub(crate) color_reference: Option<ColorReference>,
    pub(crate) color_correction: bool,
    /// Index of the next frame file.
    pub(crate) frame_save: u64,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            shift_remainder: (0.0, 0.0),
            last_raw: None,
            last_published: None,
            color_reference: None,
            color_correction: true,
            frame_save: 0,
        }
    }
}

impl RunState {
    /// Accumulate a per-frame shift and return the whole-pixel part to apply now.
    ///
    /// The fractional remainder is kept for the next frame.
    pub(crate) fn take_shift(&mut self, dx: f64, dy: f64) -> (i64, i64) {
        let x = self.shift_remainder.0 + dx;
        let y = self.shift_remainder.1 + dy;
        let (ix, iy) = (x.trunc(), y.trunc());
        self.shift_remainder = (x - ix, y - iy);
        (ix as i64, iy as i64)
    }

    pub(crate) fn next_frame_index(&mut self) -> u64 {
        let i = self.frame_save;
        self.frame_save += 1;
        i
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/state.rs"]
mod tests;
