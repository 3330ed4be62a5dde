use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ParseError;
use crate::formats::{SubtitleAdapter, cue_text_lines, normalize_newlines};
use crate::markup::{MarkupMapping, NativeMarkup, StyleMap, to_canonical};
use crate::subtitle_track::{AppendOptions, SubtitleTrack};
use crate::time_expression::ClockFormat;

// @module: SubRip adapter

// @const: SRT timing line, extra cue settings after the end time are ignored
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3}:\d{2}:\d{2}(?:[,.]\d+)?)\s*-->\s*(\d{1,3}:\d{2}:\d{2}(?:[,.]\d+)?)")
        .expect("Invalid SRT timestamp regex")
});

const FORMAT: &str = "srt";

const LINE_DELIMITER: &str = "\r\n";

/// SubRip: numbered blocks with `HH:MM:SS,mmm --> HH:MM:SS,mmm` timings
#[derive(Debug, Default, Clone, Copy)]
pub struct SrtAdapter;

// Cue being assembled by the parser
struct PendingCue {
    start: Option<u64>,
    end: Option<u64>,
    lines: Vec<String>,
}

fn parse_timing(line: &str, format: &str) -> Result<Option<(Option<u64>, Option<u64>)>, ParseError> {
    let Some(caps) = TIMESTAMP_REGEX.captures(line) else {
        return Ok(None);
    };
    let start = ClockFormat::SRT
        .parse(&caps[1])
        .map_err(|e| ParseError::time(format, e))?;
    let end = ClockFormat::SRT
        .parse(&caps[2])
        .map_err(|e| ParseError::time(format, e))?;
    Ok(Some((start, end)))
}

fn flush(track: &mut SubtitleTrack, pending: Option<PendingCue>) {
    if let Some(cue) = pending {
        let text = to_canonical(NativeMarkup::Html(&cue.lines.join("\n")), &StyleMap::default());
        track.append_with(cue.start, cue.end, &text, AppendOptions::canonical());
    }
}

/// Read numbered `start --> end` blocks. Shared with the HTML adapter,
/// which writes the same layout; `format` names the caller in errors.
pub(crate) fn parse_blocks(raw: &str, language_code: &str, format: &str) -> Result<SubtitleTrack, ParseError> {
    let content = normalize_newlines(raw);
    let mut track = SubtitleTrack::new(language_code);
    let mut pending: Option<PendingCue> = None;
    let mut seen_index = false;

    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        // A blank line closes the current block
        if trimmed.is_empty() {
            flush(&mut track, pending.take());
            seen_index = false;
            continue;
        }

        if let Some(cue) = pending.as_mut() {
            cue.lines.push(trimmed.to_string());
            continue;
        }

        if !seen_index && trimmed.chars().all(|c| c.is_ascii_digit()) {
            seen_index = true;
            continue;
        }

        match parse_timing(trimmed, format)? {
            Some((start, end)) => {
                pending = Some(PendingCue {
                    start,
                    end,
                    lines: Vec::new(),
                });
            }
            None => {
                warn!("Skipping unexpected {} line {}: {}", format, line_no + 1, trimmed);
            }
        }
    }
    flush(&mut track, pending.take());

    if track.is_empty() {
        return Err(ParseError::no_subtitles(format));
    }
    debug!("Parsed {} {} cues", track.len(), format);
    Ok(track)
}

impl SubtitleAdapter for SrtAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["srt"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        parse_blocks(raw, language_code, FORMAT)
    }

    fn generate(&self, track: &SubtitleTrack, _language_code: &str) -> String {
        let mut output = String::new();
        for (i, item) in track.subtitle_items(Some(&MarkupMapping::html())).iter().enumerate() {
            write_block(&mut output, i + 1, item.start_time, item.end_time, &item.text);
        }
        output
    }
}

/// Append one numbered CRLF block
pub(crate) fn write_block(output: &mut String, number: usize, start: Option<u64>, end: Option<u64>, text: &str) {
    output.push_str(&number.to_string());
    output.push_str(LINE_DELIMITER);
    output.push_str(&format!(
        "{} --> {}",
        ClockFormat::SRT.format(start),
        ClockFormat::SRT.format(end)
    ));
    output.push_str(LINE_DELIMITER);
    output.push_str(&cue_text_lines(text).join(LINE_DELIMITER));
    output.push_str(LINE_DELIMITER);
    output.push_str(LINE_DELIMITER);
}
