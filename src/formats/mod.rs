/*!
 * Format adapters.
 *
 * Each supported subtitle format has one adapter that parses raw text into
 * a canonical `SubtitleTrack` and generates raw text back from one:
 * - `srt`: SubRip
 * - `sbv`: YouTube SBV
 * - `ssa`, `ass`: SubStation Alpha / Advanced SubStation Alpha
 * - `vtt`: WebVTT
 * - `txt`: plain text
 * - `json`: JSON cue list
 * - `youtube`: YouTube timed text XML
 * - `dfxp`, `ttml`: DFXP and TTML
 * - `html`: SubRip blocks with canonical HTML text
 */

use std::fmt::Debug;

use crate::errors::ParseError;
use crate::subtitle_track::SubtitleTrack;

/// Common trait for all format adapters
///
/// Adapters are interchangeable behind the `FormatRegistry`. They never keep
/// state between calls.
pub trait SubtitleAdapter: Send + Sync + Debug {
    /// Short format names handled by this adapter, e.g. `["ssa", "ass"]`
    fn file_types(&self) -> &'static [&'static str];

    /// Parse a document into a fresh track
    ///
    /// # Arguments
    /// * `raw` - Document text
    /// * `language_code` - Language assigned to the track
    ///
    /// # Returns
    /// * `Result<SubtitleTrack, ParseError>` - The track, or an error naming the format.
    ///   A document without any cue is an error.
    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError>;

    /// Generate a document from the current state of a track
    fn generate(&self, track: &SubtitleTrack, language_code: &str) -> String;

    /// Primary format name
    fn name(&self) -> &'static str {
        self.file_types().first().copied().unwrap_or("unknown")
    }
}

/// Normalize line endings to `\n`
pub(crate) fn normalize_newlines(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Split rendered cue text into lines for block formats, where an empty
/// line ends the cue. A break next to an empty line is written as a literal
/// `<br>` instead, so `a<br><br>b` becomes `a<br>` and `b`.
pub(crate) fn cue_text_lines(text: &str) -> Vec<String> {
    let mut segments = text.split('\n');
    let mut current = segments.next().unwrap_or_default().to_string();
    let mut lines = Vec::new();
    for segment in segments {
        if current.trim().is_empty() || segment.trim().is_empty() {
            current.push_str("<br>");
            current.push_str(segment);
        } else {
            lines.push(std::mem::replace(&mut current, segment.to_string()));
        }
    }
    lines.push(current);
    lines
}

pub mod dfxp;
pub mod html;
pub mod json;
pub mod registry;
pub mod sbv;
pub mod srt;
pub mod ssa;
pub mod txt;
pub mod webvtt;
pub mod youtube;

pub use dfxp::{DfxpAdapter, TtmlAdapter, merge_tracks, split_merged_tracks};
pub use html::HtmlAdapter;
pub use json::JsonAdapter;
pub use registry::FormatRegistry;
pub use sbv::SbvAdapter;
pub use srt::SrtAdapter;
pub use ssa::SsaAdapter;
pub use txt::TxtAdapter;
pub use webvtt::WebVttAdapter;
pub use youtube::YoutubeAdapter;
