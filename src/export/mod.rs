//! Playback rate, encoder scripts, external frame interpolation and optional `ffmpeg`
//! encoding of persisted frames.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;

use crate::config::OutputToggles;
use crate::foundation::core::frame_file_name;
use crate::foundation::error::{AnimatorError, AnimatorResult};

/// Input pattern matching the persisted frame names.
pub const FRAME_PATTERN: &str = "frame_%05d.png";
/// Folder, inside the run directory, the external interpolator writes its frames to.
pub const FILM_OUTPUT_DIR: &str = "interpolated_frames";
pub const FILM_SCRIPT_NAME: &str = "make_film.sh";

/// Video containers the run can encode to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    Gif,
    Mp4,
    Webm,
}

impl Container {
    pub const ALL: [Self; 3] = [Self::Gif, Self::Mp4, Self::Webm];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    pub fn enabled(self, toggles: &OutputToggles) -> bool {
        match self {
            Self::Gif => toggles.gif,
            Self::Mp4 => toggles.mp4,
            Self::Webm => toggles.webm,
        }
    }

    pub fn script_name(self) -> String {
        format!("make_{}.sh", self.extension())
    }

    pub fn output_name(self) -> String {
        format!("video.{}", self.extension())
    }

    /// `ffmpeg` arguments (without the program name) encoding `input` into `output`.
    pub fn ffmpeg_args(self, fps: f64, input: &str, output: &str) -> Vec<String> {
        let fps = fps.to_string();
        let mut args = vec!["-y".to_owned()];
        match self {
            Self::Gif => args.extend(["-r".into(), fps, "-i".into(), input.into()]),
            Self::Mp4 => args.extend([
                "-r".into(),
                fps.clone(),
                "-i".into(),
                input.into(),
                "-c:v".into(),
                "libx264".into(),
                "-vf".into(),
                format!("fps={fps}"),
                "-pix_fmt".into(),
                "yuv420p".into(),
                "-crf".into(),
                "17".into(),
                "-preset".into(),
                "veryfast".into(),
            ]),
            Self::Webm => args.extend([
                "-framerate".into(),
                fps,
                "-i".into(),
                input.into(),
                "-crf".into(),
                "50".into(),
                "-preset".into(),
                "veryfast".into(),
            ]),
        }
        args.push(output.to_owned());
        args
    }
}

/// Playback rate of the persisted frame sequence.
///
/// Morph smoothing inserts `smoothing` frames between each pair of rendered frames. External
/// frame interpolation doubles the inserted frames on every pass instead.
pub fn final_fps(fps: f64, smoothing: u32, film_interpolation: bool) -> f64 {
    if smoothing == 0 {
        return fps;
    }
    if film_interpolation {
        let mut total = fps;
        let mut added = fps - 1.0;
        for _ in 0..smoothing {
            total += added;
            added *= 2.0;
        }
        total
    } else {
        fps + f64::from(smoothing) * (fps - 1.0)
    }
}

/// Write one shell script per container into `dir`, each running `ffmpeg` over the frames
/// in that directory.
pub fn write_encode_scripts(dir: &Path, fps: f64) -> AnimatorResult<Vec<PathBuf>> {
    Container::ALL
        .iter()
        .map(|&c| {
            let args = c.ffmpeg_args(fps, FRAME_PATTERN, &c.output_name());
            let body = format!(
                "#!/bin/sh\ncd \"$(dirname \"$0\")\" || exit 1\nexec ffmpeg {}\n",
                args.join(" ")
            );
            let path = dir.join(c.script_name());
            std::fs::write(&path, body)
                .with_context(|| format!("write encoder script {}", path.display()))?;
            Ok(path)
        })
        .collect()
}

/// Command paths with a folder are made absolute, since the interpolator runs from that
/// folder. Bare names are left to `PATH`.
fn resolve_program(command: &Path) -> AnimatorResult<PathBuf> {
    if command.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
        let resolved = std::fs::canonicalize(command)
            .with_context(|| format!("frame interpolator {} not found", command.display()))?;
        Ok(resolved)
    } else {
        Ok(command.to_path_buf())
    }
}

/// Write `make_film.sh` into `dir`: it runs `command <run dir> <passes>` from the
/// command's folder, the same call [`interpolate_frames`] makes.
pub fn write_film_script(dir: &Path, command: &Path, passes: u32) -> AnimatorResult<PathBuf> {
    let program = resolve_program(command)?;
    let folder = program
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| format!("cd \"{}\" || exit 1\n", p.display()))
        .unwrap_or_default();
    let body = format!(
        "#!/bin/sh\nrun_dir=\"$(cd \"$(dirname \"$0\")\" && pwd)\" || exit 1\n{folder}exec \"{}\" \"$run_dir\" {passes}\n",
        program.display()
    );
    let path = dir.join(FILM_SCRIPT_NAME);
    std::fs::write(&path, body)
        .with_context(|| format!("write interpolator script {}", path.display()))?;
    Ok(path)
}

fn png_files(dir: &Path) -> AnimatorResult<Vec<PathBuf>> {
    let mut files = std::fs::read_dir(dir)
        .with_context(|| format!("list {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e.eq_ignore_ascii_case("png")))
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

/// Run the external frame interpolator over the frames in `dir` and replace them with its
/// output.
///
/// The interpolator is called as `command <run dir> <passes>` from the command's folder and
/// must leave its frames in `<run dir>/interpolated_frames`. Those are renamed, in name
/// order, to `frame_NNNNN.png` after the original frames are removed. Returns the new frame
/// count. When the interpolator fails or produces nothing, the original frames stay as they
/// are.
#[tracing::instrument(skip(command))]
pub fn interpolate_frames(dir: &Path, command: &Path, passes: u32) -> AnimatorResult<usize> {
    let run_dir = std::fs::canonicalize(dir)
        .with_context(|| format!("resolve run directory {}", dir.display()))?;
    let program = resolve_program(command)?;

    let mut cmd = Command::new(&program);
    cmd.arg(&run_dir).arg(passes.to_string()).stdin(Stdio::null());
    if let Some(folder) = program.parent().filter(|p| !p.as_os_str().is_empty()) {
        cmd.current_dir(folder);
    }
    let out = cmd
        .output()
        .with_context(|| format!("spawn frame interpolator {}", program.display()))?;
    if !out.status.success() {
        return Err(AnimatorError::render(format!(
            "frame interpolator exited with {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let produced = run_dir.join(FILM_OUTPUT_DIR);
    if !produced.is_dir() {
        return Err(AnimatorError::render(format!(
            "frame interpolator left no {FILM_OUTPUT_DIR} folder"
        )));
    }
    let frames = png_files(&produced)?;
    if frames.is_empty() {
        return Err(AnimatorError::render("frame interpolator produced no frames"));
    }

    for old in png_files(&run_dir)? {
        if old
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with("frame_"))
        {
            std::fs::remove_file(&old)
                .with_context(|| format!("remove {}", old.display()))?;
        }
    }
    for (i, frame) in frames.iter().enumerate() {
        let target = run_dir.join(frame_file_name(i as u64));
        std::fs::rename(frame, &target)
            .with_context(|| format!("move {} to {}", frame.display(), target.display()))?;
    }
    tracing::info!(frames = frames.len(), "interpolated frames");
    Ok(frames.len())
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Encode the frames in `dir` for every enabled container.
///
/// Returns the videos written. Nothing is attempted when `ffmpeg` is missing.
#[tracing::instrument(skip(toggles))]
pub fn encode_videos(dir: &Path, fps: f64, toggles: &OutputToggles) -> AnimatorResult<Vec<PathBuf>> {
    let wanted = Container::ALL
        .into_iter()
        .filter(|c| c.enabled(toggles))
        .collect::<Vec<_>>();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }
    if !is_ffmpeg_on_path() {
        tracing::warn!("ffmpeg was not found on PATH, skipping video encoding");
        return Ok(Vec::new());
    }

    let input = dir.join(FRAME_PATTERN);
    let mut written = Vec::new();
    for c in wanted {
        let output = dir.join(c.output_name());
        let args = c.ffmpeg_args(
            fps,
            &input.to_string_lossy(),
            &output.to_string_lossy(),
        );
        let out = Command::new("ffmpeg")
            .args(["-loglevel", "error"])
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("spawn ffmpeg for {}", c.extension()))?;
        if !out.status.success() {
            return Err(AnimatorError::render(format!(
                "ffmpeg {} encode failed: {}",
                c.extension(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        tracing::info!(path = %output.display(), "encoded video");
        written.push(output);
    }
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/export/mod.rs"]
mod tests;
