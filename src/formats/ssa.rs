use log::{debug, warn};

use crate::errors::ParseError;
use crate::formats::{SubtitleAdapter, normalize_newlines};
use crate::markup::{MarkupMapping, NativeMarkup, StyleMap, to_canonical};
use crate::subtitle_track::{AppendOptions, SubtitleTrack};
use crate::time_expression::ClockFormat;

// @module: SubStation Alpha adapter

const FORMAT: &str = "ssa";

const LINE_DELIMITER: &str = "\r\n";

const EVENTS_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Field positions of `Dialogue:` lines, taken from the `[Events]` `Format:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventLayout {
    start: usize,
    end: usize,
    text: usize,
    count: usize,
}

impl Default for EventLayout {
    // Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
    fn default() -> Self {
        Self {
            start: 1,
            end: 2,
            text: 9,
            count: 10,
        }
    }
}

impl EventLayout {
    /// Layout for a `Format:` field list; `None` unless it names Start, End and Text
    fn from_format(fields: &str) -> Option<Self> {
        let names: Vec<String> = fields.split(',').map(|name| name.trim().to_lowercase()).collect();
        let position = |wanted: &str| names.iter().position(|name| name == wanted);
        Some(Self {
            start: position("start")?,
            end: position("end")?,
            text: position("text")?,
            count: names.len(),
        })
    }
}

/// SSA and ASS scripts; only `Dialogue` events are read
#[derive(Debug, Default, Clone, Copy)]
pub struct SsaAdapter;

impl SsaAdapter {
    // The last field keeps any commas; scripts put Text there
    fn parse_dialogue(
        line_no: usize,
        fields: &str,
        layout: &EventLayout,
    ) -> Result<Option<(Option<u64>, Option<u64>, String)>, ParseError> {
        let parts: Vec<&str> = fields.splitn(layout.count, ',').collect();
        if parts.len() < layout.count {
            warn!("Skipping SSA dialogue line {} with {} fields", line_no, parts.len());
            return Ok(None);
        }
        let time = |value: &str| {
            ClockFormat::SSA
                .parse(value.trim())
                .map_err(|e| ParseError::time(FORMAT, e))
        };
        let start = time(parts[layout.start])?;
        let end = time(parts[layout.end])?;
        let text = to_canonical(NativeMarkup::Ssa(parts[layout.text].trim()), &StyleMap::default());
        Ok(Some((start, end, text)))
    }
}

impl SubtitleAdapter for SsaAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["ssa", "ass"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        let content = normalize_newlines(raw);
        let mut track = SubtitleTrack::new(language_code);
        let mut layout = EventLayout::default();
        let mut in_events = false;

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.starts_with('[') {
                in_events = line.eq_ignore_ascii_case("[events]");
            } else if let Some(title) = line.strip_prefix("Title:") {
                let title = title.trim();
                if !title.is_empty() {
                    track.set_title(Some(title.to_string()));
                }
            } else if let Some(fields) = line.strip_prefix("Format:") {
                // Style sections carry their own Format lines
                if in_events {
                    match EventLayout::from_format(fields) {
                        Some(found) => layout = found,
                        None => warn!("Ignoring SSA event format on line {} without Start, End and Text", idx + 1),
                    }
                }
            } else if let Some(fields) = line.strip_prefix("Dialogue:") {
                if let Some((start, end, text)) = Self::parse_dialogue(idx + 1, fields, &layout)? {
                    track.append_with(start, end, &text, AppendOptions::canonical());
                }
            }
        }

        if track.is_empty() {
            return Err(ParseError::no_subtitles(FORMAT));
        }
        debug!("Parsed {} SSA dialogue events", track.len());
        Ok(track)
    }

    fn generate(&self, track: &SubtitleTrack, _language_code: &str) -> String {
        let mut output = String::from("\u{feff}");
        output.push_str("[Script Info]");
        output.push_str(LINE_DELIMITER);
        output.push_str(&format!("Title: {}", track.title().unwrap_or_default()));
        output.push_str(LINE_DELIMITER);
        output.push_str("ScriptType: v4.00+");
        output.push_str(LINE_DELIMITER);
        output.push_str(LINE_DELIMITER);
        output.push_str("[Events]");
        output.push_str(LINE_DELIMITER);
        output.push_str(EVENTS_FORMAT);
        output.push_str(LINE_DELIMITER);

        for item in track.subtitle_items(Some(&MarkupMapping::ssa())) {
            output.push_str(&format!(
                "Dialogue: 0,{},{},Default,,0000,0000,0000,,{}",
                ClockFormat::SSA.format(item.start_time),
                ClockFormat::SSA.format(item.end_time),
                item.text.replace('\n', " ")
            ));
            output.push_str(LINE_DELIMITER);
        }
        output
    }
}
