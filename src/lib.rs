/*!
 * # subcanon - canonical subtitle conversion
 *
 * A Rust library that converts subtitle and caption files between formats
 * by parsing each one into a single canonical track and generating any
 * target format from it.
 *
 * ## Features
 *
 * - SRT, SBV, SSA/ASS, WebVTT, plain text, JSON, YouTube timed text and TTML/DFXP
 * - Bold, italic, underline and line breaks preserved across formats
 * - Clock, metric and tick based time expressions
 * - Unsynced cues kept unsynced through every format
 * - Track comparison with per-cue alignment and change ratios
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `time_expression`: Millisecond time algebra and per-format clock layouts
 * - `markup`: Canonical inline markup and native syntax conversion
 * - `subtitle_track`: The canonical track and cue model
 * - `diff`: Track alignment and change ratios
 * - `formats`: One adapter per format, plus the `FormatRegistry`
 * - `xml`: Minimal XML reader for the XML based formats
 * - `app_config`: Configuration management
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod diff;
pub mod errors;
pub mod formats;
pub mod language_utils;
pub mod markup;
pub mod subtitle_track;
pub mod time_expression;
pub mod xml;

// Re-export main types for easier usage
pub use app_config::Config;
pub use diff::{DiffResult, DiffRow, diff};
pub use errors::{ConfigurationError, ParseError, SubtitleError, TimeError, TrackError, XmlError};
pub use formats::{FormatRegistry, SubtitleAdapter};
pub use markup::{MarkupMapping, NativeMarkup, StyleMap, from_canonical, to_canonical};
pub use subtitle_track::{AppendOptions, Cue, LineMeta, SubtitleLine, SubtitleTrack};
pub use time_expression::{
    TimeExpression, is_unsynced_sentinel, milliseconds_to_clock_string, parse_time_expression,
};
