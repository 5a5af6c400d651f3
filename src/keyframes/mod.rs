//! Keyframe mini-language.
//!
//! One event per line, `|`-delimited, first field a time in seconds:
//!
//! ```text
//! # comments start with '#'
//! 0   | prompt    | a cat on a sofa | blurry
//! 2.5 | transform | 1.1 | 10 | 0 | 2
//! 4   | set_stamp | logo | logo.png | 480 | 40 | 0.5 | 0
//! ```

pub mod event;
pub mod parser;
pub mod pnginfo;
pub mod vtt;

pub use event::{EventKind, KeyframeEvent, Placement, SeedValue, SourceSpec, TextBlockSpec};
pub use parser::{KeyframeParser, ParsedKeyframes, RunDirectives, SkippedLine};
