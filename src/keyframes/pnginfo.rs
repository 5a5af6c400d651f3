//! Generation parameters embedded in images: a PNG `parameters` text chunk, or the EXIF
//! `UserComment` that JPEG and WebP writers use instead.

use std::path::Path;

use anyhow::Context;
use image::ImageDecoder;

use crate::foundation::error::{AnimatorError, AnimatorResult};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const PARAMETERS_KEY: &str = "parameters";
const NEGATIVE_MARKER: &str = "\nNegative prompt: ";
const STEPS_MARKER: &str = "\nSteps:";

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const EXIF_IFD_POINTER: u16 = 0x8769;
const USER_COMMENT: u16 = 0x9286;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationInfo {
    pub positive: String,
    pub negative: String,
    pub seed: Option<u64>,
}

/// Read the embedded generation parameters of an image and split them into prompts and
/// seed. A PNG `parameters` chunk wins over an EXIF comment.
pub fn read_generation_info(path: &Path) -> AnimatorResult<GenerationInfo> {
    if !path.exists() {
        return Err(AnimatorError::asset(format!(
            "could not find image {}",
            path.display()
        )));
    }
    let bytes = std::fs::read(path).with_context(|| format!("read image {}", path.display()))?;
    let chunk = if bytes.starts_with(&PNG_SIGNATURE) {
        png_text_chunk(&bytes, PARAMETERS_KEY)?
    } else {
        None
    };
    let text = match chunk {
        Some(text) => Some(text),
        None => embedded_user_comment(&bytes)?,
    };
    let text = text.ok_or_else(|| {
        AnimatorError::keyframe(format!(
            "no generation parameters found in {}",
            path.display()
        ))
    })?;
    Ok(parse_generation_info(&text))
}

/// Split a free-text parameters block.
///
/// The positive prompt runs up to the negative-prompt marker (or the `Steps:` line when
/// there is none); the negative prompt runs from the marker to the last `Steps:` line.
pub fn parse_generation_info(text: &str) -> GenerationInfo {
    let steps_at = text.rfind(STEPS_MARKER);
    let (positive, negative) = match text.find(NEGATIVE_MARKER) {
        Some(neg_at) => {
            let neg_start = neg_at + NEGATIVE_MARKER.len();
            let neg_end = steps_at.filter(|&s| s >= neg_start).unwrap_or(text.len());
            (&text[..neg_at], &text[neg_start..neg_end])
        }
        None => (&text[..steps_at.unwrap_or(text.len())], ""),
    };

    let seed = steps_at.and_then(|s| {
        let params = &text[s + 1..];
        let rest = &params[params.find("Seed: ")? + "Seed: ".len()..];
        let end = rest.find(',').unwrap_or(rest.len());
        rest[..end].trim().parse::<u64>().ok()
    });

    GenerationInfo {
        positive: positive.trim().to_owned(),
        negative: negative.trim().to_owned(),
        seed,
    }
}

/// EXIF `UserComment` of any image format the decoder can read metadata from.
fn embedded_user_comment(bytes: &[u8]) -> AnimatorResult<Option<String>> {
    let unreadable =
        |e: image::ImageError| AnimatorError::keyframe(format!("unreadable image: {e}"));
    let mut decoder = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AnimatorError::keyframe(format!("unreadable image: {e}")))?
        .into_decoder()
        .map_err(unreadable)?;
    let exif = decoder.exif_metadata().map_err(unreadable)?;
    Ok(exif.as_deref().and_then(exif_user_comment))
}

/// Byte-order aware reads over a TIFF-structured EXIF block.
struct Tiff<'a> {
    bytes: &'a [u8],
    big_endian: bool,
}

impl<'a> Tiff<'a> {
    fn new(exif: &'a [u8]) -> Option<Self> {
        let bytes = exif.strip_prefix(EXIF_HEADER).unwrap_or(exif);
        let big_endian = match bytes.get(..2)? {
            b"MM" => true,
            b"II" => false,
            _ => return None,
        };
        let tiff = Self { bytes, big_endian };
        (tiff.u16_at(2)? == 42).then_some(tiff)
    }

    fn u16_at(&self, at: usize) -> Option<u16> {
        let b: [u8; 2] = self.bytes.get(at..at.checked_add(2)?)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(b)
        } else {
            u16::from_le_bytes(b)
        })
    }

    fn u32_at(&self, at: usize) -> Option<u32> {
        let b: [u8; 4] = self.bytes.get(at..at.checked_add(4)?)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(b)
        } else {
            u32::from_le_bytes(b)
        })
    }

    /// Offset of the 12-byte entry for `tag` in the IFD at `ifd`.
    fn entry(&self, ifd: usize, tag: u16) -> Option<usize> {
        let count = usize::from(self.u16_at(ifd)?);
        (0..count)
            .map(|i| ifd + 2 + i * 12)
            .find(|&entry| self.u16_at(entry) == Some(tag))
    }

    /// Raw bytes of an UNDEFINED-typed entry; values up to four bytes are stored inline.
    fn bytes_of(&self, entry: usize) -> Option<&'a [u8]> {
        let count = usize::try_from(self.u32_at(entry + 4)?).ok()?;
        let start = if count <= 4 {
            entry + 8
        } else {
            usize::try_from(self.u32_at(entry + 8)?).ok()?
        };
        self.bytes.get(start..start.checked_add(count)?)
    }
}

/// `UserComment` (0x9286) from the EXIF sub-IFD, decoded per its 8-byte charset prefix.
pub(crate) fn exif_user_comment(exif: &[u8]) -> Option<String> {
    let tiff = Tiff::new(exif)?;
    let ifd0 = usize::try_from(tiff.u32_at(4)?).ok()?;
    let pointer = tiff.entry(ifd0, EXIF_IFD_POINTER)?;
    let exif_ifd = usize::try_from(tiff.u32_at(pointer + 8)?).ok()?;
    let comment = tiff.entry(exif_ifd, USER_COMMENT)?;
    let raw = tiff.bytes_of(comment)?;
    let text = decode_user_comment(raw);
    (!text.is_empty()).then_some(text)
}

fn decode_user_comment(raw: &[u8]) -> String {
    let text = match raw.split_at_checked(8) {
        Some((b"ASCII\0\0\0", rest)) | Some((b"JIS\0\0\0\0\0", rest)) => {
            String::from_utf8_lossy(rest).into_owned()
        }
        Some((b"UNICODE\0", rest)) => {
            let units = rest
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        _ => String::from_utf8_lossy(raw).into_owned(),
    };
    text.trim_matches('\0').to_owned()
}

/// Find the value of text chunk `key` (`tEXt`, or uncompressed `iTXt`).
pub(crate) fn png_text_chunk(bytes: &[u8], key: &str) -> AnimatorResult<Option<String>> {
    if bytes.len() < PNG_SIGNATURE.len() || bytes[..8] != PNG_SIGNATURE {
        return Err(AnimatorError::keyframe("not a png file"));
    }

    let mut at = PNG_SIGNATURE.len();
    while at + 8 <= bytes.len() {
        let len = u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
            as usize;
        let kind = &bytes[at + 4..at + 8];
        let data_start = at + 8;
        let data_end = data_start
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| AnimatorError::keyframe("truncated png chunk"))?;
        let data = &bytes[data_start..data_end];

        match kind {
            b"tEXt" => {
                if let Some((k, v)) = split_nul(data)
                    && k == key.as_bytes()
                {
                    // tEXt is Latin-1.
                    return Ok(Some(v.iter().map(|&b| char::from(b)).collect()));
                }
            }
            b"iTXt" => {
                if let Some(v) = itxt_value(data, key) {
                    return Ok(Some(v));
                }
            }
            b"IEND" => break,
            _ => {}
        }
        // data + crc
        at = data_end + 4;
    }
    Ok(None)
}

fn split_nul(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let nul = data.iter().position(|&b| b == 0)?;
    Some((&data[..nul], &data[nul + 1..]))
}

fn itxt_value(data: &[u8], key: &str) -> Option<String> {
    let (k, rest) = split_nul(data)?;
    if k != key.as_bytes() {
        return None;
    }
    let (&compressed, rest) = rest.split_first()?;
    let (_method, rest) = rest.split_first()?;
    if compressed != 0 {
        tracing::warn!(key, "compressed iTXt chunk is not supported");
        return None;
    }
    let (_lang, rest) = split_nul(rest)?;
    let (_translated, text) = split_nul(rest)?;
    Some(String::from_utf8_lossy(text).into_owned())
}

#[cfg(test)]
#[path = "../../tests/unit/keyframes/pnginfo.rs"]
mod tests;
