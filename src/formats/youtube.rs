use log::debug;

use crate::errors::ParseError;
use crate::formats::SubtitleAdapter;
use crate::markup::{MarkupMapping, NativeMarkup, StyleMap, to_canonical};
use crate::subtitle_track::{AppendOptions, SubtitleTrack};
use crate::time_expression::parse_time_expression;
use crate::xml::{decode_entities, escape_text, parse_document};

// @module: YouTube timed text adapter

const FORMAT: &str = "youtube";

/// Default display time of a final cue that has no `dur`
pub const DEFAULT_LAST_CUE_DURATION_MS: u64 = 3000;

/// `<transcript><text start="1.5" dur="2">…</text></transcript>`
#[derive(Debug, Clone, Copy)]
pub struct YoutubeAdapter {
    /// Duration given to the last cue when it has no `dur`
    pub last_cue_duration_ms: u64,
}

impl Default for YoutubeAdapter {
    fn default() -> Self {
        Self {
            last_cue_duration_ms: DEFAULT_LAST_CUE_DURATION_MS,
        }
    }
}

// Seconds with up to three decimals, as YouTube writes them
fn seconds(value: &str) -> Result<u64, ParseError> {
    parse_time_expression(&format!("{}s", value.trim()), None).map_err(|e| ParseError::time(FORMAT, e))
}

fn format_seconds(ms: u64) -> String {
    let whole = ms / 1000;
    let fraction = ms % 1000;
    if fraction == 0 {
        whole.to_string()
    } else {
        format!("{}.{:03}", whole, fraction)
            .trim_end_matches('0')
            .to_string()
    }
}

impl SubtitleAdapter for YoutubeAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["youtube"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        let root = parse_document(raw)
            .map_err(|e| ParseError::caused_by(FORMAT, "invalid XML document", e))?;
        if root.local_name() != "transcript" {
            return Err(ParseError::malformed(
                FORMAT,
                format!("expected <transcript> root, found <{}>", root.name),
            ));
        }

        let items: Vec<_> = root
            .child_elements()
            .filter(|el| el.local_name() == "text")
            .collect();

        let mut starts = Vec::with_capacity(items.len());
        for item in &items {
            starts.push(item.attr("start").map(seconds).transpose()?);
        }

        let mut track = SubtitleTrack::new(language_code);
        for (idx, item) in items.iter().enumerate() {
            let start = starts[idx];
            let end = match (start, item.attr("dur")) {
                (Some(s), Some(dur)) => Some(s + seconds(dur)?),
                // Without a duration the cue lasts until the next one starts
                (Some(s), None) => match starts.get(idx + 1) {
                    Some(next) => *next,
                    None => Some(s + self.last_cue_duration_ms),
                },
                (None, _) => None,
            };
            // Transcripts often escape their entities twice
            let text = decode_entities(&item.text_content());
            let text = to_canonical(NativeMarkup::Html(&text), &StyleMap::default());
            track.append_with(start, end, &text, AppendOptions::canonical());
        }

        if track.is_empty() {
            return Err(ParseError::no_subtitles(FORMAT));
        }
        debug!("Parsed {} YouTube transcript cues", track.len());
        Ok(track)
    }

    fn generate(&self, track: &SubtitleTrack, _language_code: &str) -> String {
        let mut output = String::from("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<transcript>\n");
        for item in track.subtitle_items(Some(&MarkupMapping::plain())) {
            output.push_str("<text");
            if let Some(start) = item.start_time {
                output.push_str(&format!(" start=\"{}\"", format_seconds(start)));
                // No `dur`: readers end the cue where the next one starts
                if let Some(end) = item.end_time {
                    output.push_str(&format!(" dur=\"{}\"", format_seconds(end.saturating_sub(start))));
                }
            }
            output.push('>');
            output.push_str(&escape_text(&item.text));
            output.push_str("</text>\n");
        }
        output.push_str("</transcript>\n");
        output
    }
}
