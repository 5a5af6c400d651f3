use crate::foundation::error::{AnimatorError, AnimatorResult};

/// Zero-based output frame index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame rate in frames per second. Fractional rates are allowed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Fps(f64);

impl Fps {
    pub fn new(fps: f64) -> AnimatorResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(AnimatorError::validation("fps must be finite and > 0"));
        }
        Ok(Self(fps))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Number of output frames covering `total_time` seconds: `ceil(fps * total_time)`.
    pub fn frame_count(self, total_time: f64) -> u64 {
        if !total_time.is_finite() || total_time <= 0.0 {
            return 0;
        }
        (self.0 * total_time).ceil() as u64
    }

    /// Keyframe time to frame index. Truncates toward zero; negative times have no frame.
    pub fn secs_to_frame(self, secs: f64) -> Option<FrameIndex> {
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        Some(FrameIndex((secs * self.0).trunc() as u64))
    }

    /// Frames between two preview captures (`floor(fps)`, at least 1).
    pub fn preview_stride(self) -> u64 {
        (self.0.floor() as u64).max(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> AnimatorResult<Self> {
        if width == 0 || height == 0 {
            return Err(AnimatorError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }
}

/// File name of the `index`-th persisted frame. Encoders rely on this ordering.
pub fn frame_file_name(index: u64) -> String {
    format!("frame_{index:05}.png")
}

/// File name for a debug artifact written next to frame `index` (`_a`, `_b`, ...).
pub fn debug_file_name(index: u64, tag: char) -> String {
    format!("frame_{index:05}_{tag}.png")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
