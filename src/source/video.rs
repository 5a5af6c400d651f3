use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::foundation::error::{AnimatorError, AnimatorResult};

/// Basic metadata about a source video file.
#[derive(Clone, Debug)]
pub struct VideoInfo {
    #[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Probe source video metadata through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe(path: &Path) -> AnimatorResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| AnimatorError::asset(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(AnimatorError::asset(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| AnimatorError::serde(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| AnimatorError::asset("no video stream found"))?;
    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err(AnimatorError::asset("missing video dimensions from ffprobe"));
    };

    Ok(VideoInfo {
        path: path.to_path_buf(),
        width,
        height,
    })
}

/// Probe source video metadata through `ffprobe`.
///
/// Returns an error when the `media-ffmpeg` feature is disabled.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe(_path: &Path) -> AnimatorResult<VideoInfo> {
    Err(AnimatorError::validation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Decode frame `index` (0-based, in stream order). `None` past the end of the stream.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_frame(info: &VideoInfo, index: u64) -> AnimatorResult<Option<RgbaImage>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&info.path)
        .args([
            "-vf",
            &format!("select=eq(n\\,{index})"),
            "-vsync",
            "0",
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| AnimatorError::asset(format!("failed to run ffmpeg for video decode: {e}")))?;
    if !out.status.success() {
        return Err(AnimatorError::asset(format!(
            "ffmpeg video decode failed for '{}': {}",
            info.path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = info.width as usize * info.height as usize * 4;
    if out.stdout.is_empty() {
        return Ok(None);
    }
    if out.stdout.len() < expected_len {
        return Err(AnimatorError::asset(format!(
            "decoded video frame has invalid size: got {} bytes, expected {expected_len}",
            out.stdout.len()
        )));
    }
    let mut bytes = out.stdout;
    bytes.truncate(expected_len);
    RgbaImage::from_raw(info.width, info.height, bytes)
        .map(Some)
        .ok_or_else(|| AnimatorError::render("video frame buffer size mismatch"))
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_frame(_info: &VideoInfo, _index: u64) -> AnimatorResult<Option<RgbaImage>> {
    Err(AnimatorError::validation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}
