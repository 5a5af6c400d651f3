use crate::foundation::error::{AnimatorError, AnimatorResult};
use serde::{Deserialize, Serialize};

/// Straight-alpha 8-bit color used by overlay styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub fn to_peniko(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// Parse a color literal.
    ///
    /// Accepted forms:
    /// - numeric tuple `(r, g, b)` or `(r, g, b, a)` with components in `0..=255`
    /// - hex `#RRGGBB` or `#RRGGBBAA`
    /// - one of the named colors in [`named`]
    ///
    /// Anything else is rejected; nothing is ever evaluated.
    pub fn parse(s: &str) -> AnimatorResult<Self> {
        let s = s.trim();
        if s.starts_with('(') || s.starts_with('[') {
            return parse_tuple(s);
        }
        if s.starts_with('#') {
            return parse_hex(s);
        }
        named(s).ok_or_else(|| AnimatorError::validation(format!("unknown color \"{s}\"")))
    }
}

impl std::str::FromStr for Color {
    type Err = AnimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Closed table of color names accepted in keyframe text.
pub fn named(name: &str) -> Option<Color> {
    let c = match name.trim().to_ascii_lowercase().as_str() {
        "white" => Color::WHITE,
        "black" => Color::BLACK,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" => Color::rgb(0, 255, 255),
        "magenta" => Color::rgb(255, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "pink" => Color::rgb(255, 192, 203),
        "brown" => Color::rgb(165, 42, 42),
        "transparent" => Color::rgba(0, 0, 0, 0),
        _ => return None,
    };
    Some(c)
}

fn parse_tuple(s: &str) -> AnimatorResult<Color> {
    let inner = s
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .or_else(|| s.strip_prefix('[').and_then(|r| r.strip_suffix(']')))
        .ok_or_else(|| AnimatorError::validation(format!("unbalanced color tuple \"{s}\"")))?;

    let parts = inner
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<u8>().map_err(|_| {
                AnimatorError::validation(format!("color component \"{p}\" is not in 0..=255"))
            })
        })
        .collect::<AnimatorResult<Vec<u8>>>()?;

    match parts.as_slice() {
        [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
        [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
        _ => Err(AnimatorError::validation(
            "color tuple must have 3 (r,g,b) or 4 (r,g,b,a) components",
        )),
    }
}

fn parse_hex(s: &str) -> AnimatorResult<Color> {
    let s = s.trim_start_matches('#');

    fn hex_byte(pair: &str) -> AnimatorResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| AnimatorError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if !s.is_ascii() {
        return Err(AnimatorError::validation("hex color must be ASCII"));
    }
    match s.len() {
        6 => Ok(Color::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Color::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err(AnimatorError::validation(
            "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
