use std::path::{Path, PathBuf};

use crate::foundation::color::Color;
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::AnimatorError;
use crate::keyframes::event::{
    EventKind, KeyframeEvent, Placement, SeedValue, SourceSpec, TextBlockSpec,
};
use crate::keyframes::{pnginfo, vtt};

/// A line that produced no event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Run-wide settings carried by keyframe lines rather than per-frame values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunDirectives {
    pub source: Option<SourceSpec>,
    pub debug: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedKeyframes {
    /// Sorted by frame; source order within a frame.
    pub events: Vec<KeyframeEvent>,
    pub skipped: Vec<SkippedLine>,
}

impl ParsedKeyframes {
    pub fn events_at(&self, frame: FrameIndex) -> impl Iterator<Item = &KeyframeEvent> {
        let start = self.events.partition_point(|e| e.frame < frame);
        self.events[start..]
            .iter()
            .take_while(move |e| e.frame == frame)
    }

    /// Last `source` and `debug` lines win.
    pub fn directives(&self) -> RunDirectives {
        let mut out = RunDirectives::default();
        for e in &self.events {
            match &e.kind {
                EventKind::Source(s) => out.source = Some(s.clone()),
                EventKind::Debug(on) => out.debug = *on,
                _ => {}
            }
        }
        out
    }
}

/// Parses keyframe text into [`KeyframeEvent`]s.
///
/// Malformed lines never fail the parse: they are logged and reported in
/// [`ParsedKeyframes::skipped`]. Relative file paths resolve against the process working
/// directory.
#[derive(Clone, Copy, Debug)]
pub struct KeyframeParser {
    fps: Fps,
    total_time: f64,
}

enum LineError {
    Malformed(String),
    MissingAsset(String),
}

type LineResult<T> = Result<T, LineError>;

impl From<AnimatorError> for LineError {
    fn from(err: AnimatorError) -> Self {
        if err.is_missing_asset() {
            Self::MissingAsset(err.to_string())
        } else {
            Self::Malformed(err.to_string())
        }
    }
}

fn malformed<T>(msg: impl Into<String>) -> LineResult<T> {
    Err(LineError::Malformed(msg.into()))
}

impl KeyframeParser {
    pub fn new(fps: Fps, total_time: f64) -> Self {
        Self { fps, total_time }
    }

    #[tracing::instrument(skip(self, text), fields(fps = self.fps.as_f64()))]
    pub fn parse(&self, text: &str) -> ParsedKeyframes {
        let mut out = ParsedKeyframes::default();
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match self.parse_line(trimmed, line) {
                Ok(events) => out.events.extend(events),
                Err(err) => {
                    let reason = match err {
                        LineError::Malformed(r) => {
                            tracing::warn!(line, text = trimmed, reason = %r, "ignoring keyframe");
                            r
                        }
                        LineError::MissingAsset(r) => {
                            tracing::warn!(line, text = trimmed, reason = %r, "keyframe asset unavailable, skipping");
                            r
                        }
                    };
                    out.skipped.push(SkippedLine {
                        line,
                        text: trimmed.to_owned(),
                        reason,
                    });
                }
            }
        }
        out.events.sort_by_key(|e| e.frame);
        tracing::debug!(
            events = out.events.len(),
            skipped = out.skipped.len(),
            "parsed keyframes"
        );
        out
    }

    fn parse_line(&self, text: &str, line: usize) -> LineResult<Vec<KeyframeEvent>> {
        let fields = text.split('|').collect::<Vec<_>>();
        if fields.len() < 2 {
            return malformed("expected at least `time | keyword`");
        }
        let secs = parse_f64(fields[0], "time")?;
        let Some(frame) = self.fps.secs_to_frame(secs) else {
            return malformed(format!("time {secs} is negative"));
        };
        let keyword = fields[1].trim().to_ascii_lowercase();
        let n = fields.len();
        let arity = |expected: usize| -> LineResult<()> {
            if n == expected {
                Ok(())
            } else {
                malformed(format!(
                    "`{keyword}` takes {expected} fields, found {n}"
                ))
            }
        };
        let event = |kind: EventKind| KeyframeEvent { frame, line, kind };

        let kind = match keyword.as_str() {
            "transform" => {
                arity(6)?;
                EventKind::Transform {
                    zoom: parse_f64(fields[2], "zoom")?,
                    x_shift: parse_f64(fields[3], "x shift")?,
                    y_shift: parse_f64(fields[4], "y shift")?,
                    rotation: parse_f64(fields[5], "rotation")?,
                }
            }
            "perspective" => {
                arity(11)?;
                let mut corners = [(0.0, 0.0); 4];
                for (i, c) in corners.iter_mut().enumerate() {
                    *c = (
                        parse_f64(fields[2 + 2 * i], "corner x")?,
                        parse_f64(fields[3 + 2 * i], "corner y")?,
                    );
                }
                EventKind::Perspective {
                    corners,
                    unsharpen: parse_f64(fields[10], "unsharpen")?,
                }
            }
            "denoise" => {
                arity(3)?;
                EventKind::Denoise(parse_f64(fields[2], "denoise")?)
            }
            "cfg_scale" => {
                arity(3)?;
                EventKind::CfgScale(parse_f64(fields[2], "cfg scale")?)
            }
            "noise" => {
                arity(3)?;
                EventKind::Noise(parse_f64(fields[2], "noise")?)
            }
            "seed" => {
                arity(3)?;
                EventKind::Seed(parse_seed(fields[2])?)
            }
            "prompt" => {
                if n != 3 && n != 4 {
                    return malformed(format!("`prompt` takes 3 or 4 fields, found {n}"));
                }
                EventKind::Prompt {
                    positive: clean_prompt(fields[2]),
                    negative: fields.get(3).map(|s| clean_prompt(s)).unwrap_or_default(),
                }
            }
            "prompt_from_png" | "prompt_from_file" => {
                arity(3)?;
                let path = PathBuf::from(clean_prompt(fields[2]));
                let info = pnginfo::read_generation_info(&path)?;
                let mut events = vec![event(EventKind::PromptFromFile {
                    path,
                    positive: info.positive,
                    negative: info.negative,
                    seed: info.seed,
                })];
                if let Some(seed) = info.seed {
                    events.push(event(EventKind::Seed(SeedValue::Fixed(seed))));
                }
                return Ok(events);
            }
            "prompt_vtt" | "prompt_track" => {
                arity(3)?;
                let path = PathBuf::from(fields[2].trim());
                let cues = vtt::read_vtt(&path, self.fps, self.total_time)?;
                return Ok(cues
                    .into_iter()
                    .map(|cue| KeyframeEvent {
                        frame: cue.frame,
                        line,
                        kind: EventKind::Prompt {
                            positive: clean_prompt(&cue.positive),
                            negative: clean_prompt(&cue.negative),
                        },
                    })
                    .collect());
            }
            "template" => {
                arity(4)?;
                EventKind::Template {
                    positive: clean_prompt(fields[2]),
                    negative: clean_prompt(fields[3]),
                }
            }
            "source" => {
                arity(4)?;
                EventKind::Source(parse_source(fields[2], fields[3])?)
            }
            "model" => {
                arity(3)?;
                let name = fields[2].trim();
                if name.is_empty() {
                    return malformed("empty model name");
                }
                EventKind::Model {
                    name: name.to_owned(),
                }
            }
            "col_set" | "color_correction_set" => {
                arity(2)?;
                EventKind::ColorCorrectionSet
            }
            "col_clear" | "color_correction_clear" => {
                arity(2)?;
                EventKind::ColorCorrectionClear
            }
            "prop" => {
                arity(7)?;
                EventKind::Prop(parse_placement(&fields[2..7])?)
            }
            "set_stamp" | "stamp_set" => {
                arity(8)?;
                EventKind::StampSet {
                    name: parse_name(fields[2])?,
                    placement: parse_placement(&fields[3..8])?,
                }
            }
            "clear_stamp" | "stamp_clear" => {
                arity(3)?;
                EventKind::StampClear {
                    name: parse_name(fields[2])?,
                }
            }
            "set_text" | "text_set" => {
                arity(11)?;
                EventKind::TextSet(TextBlockSpec {
                    name: parse_name(fields[2])?,
                    text: fields[3].trim().replace("\\n", "\n"),
                    x: parse_i32(fields[4], "x")?,
                    y: parse_i32(fields[5], "y")?,
                    w: parse_u32(fields[6], "width")?,
                    h: parse_u32(fields[7], "height")?,
                    background: parse_color(fields[8])?,
                    foreground: parse_color(fields[9])?,
                    font: PathBuf::from(fields[10].trim()),
                })
            }
            "clear_text" | "text_clear" => {
                arity(3)?;
                EventKind::TextClear {
                    name: parse_name(fields[2])?,
                }
            }
            "debug" => {
                arity(3)?;
                EventKind::Debug(parse_bool(fields[2])?)
            }
            other => return malformed(format!("unknown keyword `{other}`")),
        };
        Ok(vec![event(kind)])
    }
}

/// Trim whitespace and stray separating commas from prompt text.
fn clean_prompt(s: &str) -> String {
    s.trim().trim_matches(',').trim().to_owned()
}

fn parse_f64(s: &str, what: &str) -> LineResult<f64> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => malformed(format!("{what}: `{}` is not a number", s.trim())),
    }
}

fn parse_i32(s: &str, what: &str) -> LineResult<i32> {
    let v = parse_f64(s, what)?;
    if v < f64::from(i32::MIN) || v > f64::from(i32::MAX) {
        return malformed(format!("{what}: {v} is out of range"));
    }
    Ok(v.trunc() as i32)
}

fn parse_u32(s: &str, what: &str) -> LineResult<u32> {
    let v = parse_f64(s, what)?;
    if v < 0.0 || v > f64::from(u32::MAX) {
        return malformed(format!("{what}: {v} is out of range"));
    }
    Ok(v.trunc() as u32)
}

fn parse_seed(s: &str) -> LineResult<SeedValue> {
    match s.trim().parse::<i64>() {
        Ok(-1) => Ok(SeedValue::Random),
        Ok(v) if (0..=i64::from(u32::MAX)).contains(&v) => Ok(SeedValue::Fixed(v as u64)),
        _ => malformed(format!("seed: `{}` is not -1 or a 32-bit seed", s.trim())),
    }
}

fn parse_bool(s: &str) -> LineResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => malformed(format!("`{other}` is not a boolean")),
    }
}

fn parse_name(s: &str) -> LineResult<String> {
    let name = s.trim();
    if name.is_empty() {
        return malformed("empty name");
    }
    Ok(name.to_owned())
}

fn parse_color(s: &str) -> LineResult<Color> {
    Color::parse(s).map_err(|e| LineError::Malformed(e.to_string()))
}

/// `file | x | y | scale | rotation`
fn parse_placement(fields: &[&str]) -> LineResult<Placement> {
    let asset = fields[0].trim();
    if asset.is_empty() {
        return malformed("empty asset file name");
    }
    Ok(Placement {
        asset: PathBuf::from(asset),
        x: parse_i32(fields[1], "x")?,
        y: parse_i32(fields[2], "y")?,
        scale: parse_f64(fields[3], "scale")?,
        rotation: parse_f64(fields[4], "rotation")?,
    })
}

fn parse_source(kind: &str, path: &str) -> LineResult<SourceSpec> {
    let path = path.trim();
    match kind.trim().to_ascii_lowercase().as_str() {
        "video" => {
            if Path::new(path).exists() {
                Ok(SourceSpec::Video(PathBuf::from(path)))
            } else {
                Err(LineError::MissingAsset(format!(
                    "could not locate video {path}"
                )))
            }
        }
        "images" => {
            let matches = glob::glob(path)
                .map_err(|e| LineError::Malformed(format!("bad glob pattern `{path}`: {e}")))?;
            let mut files = matches.filter_map(Result::ok).collect::<Vec<_>>();
            files.sort();
            if files.is_empty() {
                return Err(LineError::MissingAsset(format!(
                    "no images found for {path}"
                )));
            }
            tracing::info!(count = files.len(), pattern = path, "found source images");
            Ok(SourceSpec::Images(files))
        }
        other => malformed(format!("unknown source kind `{other}`")),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/keyframes/parser.rs"]
mod tests;
