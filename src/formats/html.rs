use crate::errors::ParseError;
use crate::formats::SubtitleAdapter;
use crate::formats::srt::{parse_blocks, write_block};
use crate::subtitle_track::SubtitleTrack;

// @module: HTML snippet adapter

const FORMAT: &str = "html";

/// SubRip block layout carrying the canonical HTML markup untouched:
/// `<br>` stays a tag and entities stay escaped, so the text can be
/// dropped straight into a web page.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlAdapter;

impl SubtitleAdapter for HtmlAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["html"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        parse_blocks(raw, language_code, FORMAT)
    }

    fn generate(&self, track: &SubtitleTrack, _language_code: &str) -> String {
        let mut output = String::new();
        for (i, item) in track.subtitle_items(None).iter().enumerate() {
            write_block(&mut output, i + 1, item.start_time, item.end_time, &item.text);
        }
        output
    }
}
