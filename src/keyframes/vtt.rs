//! WebVTT prompt tracks.
//!
//! Each cue's first text line containing `|` is read as `positive | negative`; the cue's
//! start time selects the frame.

use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{AnimatorError, AnimatorResult};

#[derive(Clone, Debug, PartialEq)]
pub struct PromptCue {
    pub frame: FrameIndex,
    pub positive: String,
    pub negative: String,
}

pub fn read_vtt(path: &Path, fps: Fps, total_time: f64) -> AnimatorResult<Vec<PromptCue>> {
    if !path.exists() {
        return Err(AnimatorError::asset(format!(
            "cannot locate vtt file {}",
            path.display()
        )));
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read vtt file {}", path.display()))?;
    parse_vtt(&text, fps, total_time)
}

/// Parse WebVTT text. Cues starting at or after `total_time` are dropped.
pub fn parse_vtt(text: &str, fps: Fps, total_time: f64) -> AnimatorResult<Vec<PromptCue>> {
    let mut lines = text.lines();
    let header = lines.next().unwrap_or_default();
    if !header.contains("WEBVTT") {
        return Err(AnimatorError::keyframe(format!(
            "incorrect vtt header: {header:?}"
        )));
    }

    let mut cues = Vec::new();
    let mut pending: Option<(f64, FrameIndex)> = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((start, _)) = line.split_once("-->") {
            pending = parse_timestamp(start.trim())
                .and_then(|secs| fps.secs_to_frame(secs).map(|frame| (secs, frame)));
            if pending.is_none() {
                tracing::warn!(line, "vtt: malformed cue timing, skipping cue");
            }
            continue;
        }

        if let Some((pos, neg)) = line.split_once('|') {
            let Some((secs, frame)) = pending else {
                continue;
            };
            if secs < total_time {
                let neg = neg.split('|').next().unwrap_or_default();
                cues.push(PromptCue {
                    frame,
                    positive: pos.trim().trim_start_matches('-').trim().to_owned(),
                    negative: neg.trim().to_owned(),
                });
            }
            pending = None;
        }
    }
    Ok(cues)
}

/// `mm:ss.mmm` or `hh:mm:ss.mmm` to seconds.
fn parse_timestamp(s: &str) -> Option<f64> {
    let parts = s
        .split(':')
        .map(|p| p.trim().parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;
    let secs = match parts.as_slice() {
        [m, s] => m * 60.0 + s,
        [h, m, s] => h * 3600.0 + m * 60.0 + s,
        _ => return None,
    };
    secs.is_finite().then_some(secs)
}

#[cfg(test)]
#[path = "../../tests/unit/keyframes/vtt.rs"]
mod tests;
