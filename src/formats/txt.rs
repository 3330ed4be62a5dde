use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ParseError;
use crate::formats::{SubtitleAdapter, normalize_newlines};
use crate::markup::{MarkupMapping, NativeMarkup, StyleMap, to_canonical};
use crate::subtitle_track::{AppendOptions, SubtitleTrack};

// @module: Plain text adapter

// @const: Blank lines separate cues
static BLANK_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n").expect("Invalid blank line regex"));

const FORMAT: &str = "txt";

/// Plain text, one unsynced cue per paragraph
#[derive(Debug, Default, Clone, Copy)]
pub struct TxtAdapter;

impl SubtitleAdapter for TxtAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        let content = normalize_newlines(raw);
        let mut track = SubtitleTrack::new(language_code);

        for block in BLANK_LINE_REGEX.split(&content) {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }
            let text = to_canonical(NativeMarkup::Html(block), &StyleMap::default());
            track.append_with(None, None, &text, AppendOptions::canonical());
        }

        if track.is_empty() {
            return Err(ParseError::no_subtitles(FORMAT));
        }
        debug!("Parsed {} text paragraphs", track.len());
        Ok(track)
    }

    fn generate(&self, track: &SubtitleTrack, _language_code: &str) -> String {
        track
            .subtitle_items(Some(&MarkupMapping::plain()))
            .into_iter()
            .map(|item| item.text)
            // An empty paragraph would read back as part of the separator
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
