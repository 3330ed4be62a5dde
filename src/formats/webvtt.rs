use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::errors::ParseError;
use crate::formats::{SubtitleAdapter, cue_text_lines, normalize_newlines};
use crate::markup::{MarkupMapping, NativeMarkup, StyleMap, to_canonical};
use crate::subtitle_track::{AppendOptions, REGION_TOP, SubtitleTrack};
use crate::time_expression::ClockFormat;

// @module: WebVTT adapter

// @const: Cue timing line, hours optional, followed by cue settings
static CUE_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:\d{2,3}:)?\d{2}:\d{2}(?:\.\d+)?)\s+-->\s+((?:\d{2,3}:)?\d{2}:\d{2}(?:\.\d+)?)(?:[ \t]+(.*))?$")
        .expect("Invalid WebVTT timing regex")
});

// @const: `{...}` blocks left over from other formats
static BRACE_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*?\}").expect("Invalid brace block regex"));

// @const: Inline cue timestamps such as `<00:00:01.000>`
static INLINE_TIMESTAMP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\d[^<>]*>").expect("Invalid inline timestamp regex"));

const FORMAT: &str = "vtt";

const PARAGRAPH_NOTE: &str = "NOTE Paragraph";

/// WebVTT with paragraph notes and a `line` setting for top placement
#[derive(Debug, Default, Clone, Copy)]
pub struct WebVttAdapter;

struct PendingCue {
    start: Option<u64>,
    end: Option<u64>,
    region: Option<String>,
    new_paragraph: bool,
    lines: Vec<String>,
}

// `MM:SS.mmm` gets an hour field so the clock grammar accepts it
fn parse_time(value: &str) -> Result<Option<u64>, ParseError> {
    let full = if value.matches(':').count() == 1 {
        format!("00:{}", value)
    } else {
        value.to_string()
    };
    ClockFormat::WEBVTT
        .parse(&full)
        .map_err(|e| ParseError::time(FORMAT, e))
}

fn parse_cue_settings(settings: &str) -> HashMap<&str, &str> {
    settings
        .split_whitespace()
        .filter_map(|setting| setting.split_once(':'))
        .collect()
}

/// `line:` values near the top of the frame map to the `top` region
pub fn region_from_settings(settings: &str) -> Option<String> {
    let settings = parse_cue_settings(settings);
    let line = settings.get("line")?;
    let line = line.split(',').next().unwrap_or_default();
    let is_top = match line.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().map(|p| p <= 20.0).unwrap_or(false),
        None => line.parse::<i64>().map(|n| (0..=5).contains(&n)).unwrap_or(false),
    };
    is_top.then(|| REGION_TOP.to_string())
}

fn flush(track: &mut SubtitleTrack, pending: Option<PendingCue>) {
    if let Some(cue) = pending {
        let joined = cue.lines.join("\n");
        let cleaned = BRACE_BLOCK_REGEX.replace_all(&joined, "");
        let cleaned = INLINE_TIMESTAMP_REGEX.replace_all(&cleaned, "");
        let text = to_canonical(NativeMarkup::Html(&cleaned), &StyleMap::default());
        track.append_with(
            cue.start,
            cue.end,
            &text,
            AppendOptions::canonical()
                .paragraph(cue.new_paragraph)
                .region(cue.region),
        );
    }
}

impl SubtitleAdapter for WebVttAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["vtt"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        let content = normalize_newlines(raw);
        let mut lines = content.lines().peekable();

        match lines.peek() {
            Some(first) if first.trim_start().starts_with("WEBVTT") => {
                lines.next();
            }
            _ => warn!("WebVTT document without WEBVTT header"),
        }

        let mut track = SubtitleTrack::new(language_code);
        let mut pending: Option<PendingCue> = None;
        let mut paragraph_marked = false;
        let mut in_note = false;

        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                flush(&mut track, pending.take());
                in_note = false;
                continue;
            }
            if let Some(cue) = pending.as_mut() {
                cue.lines.push(trimmed.to_string());
                continue;
            }
            if in_note {
                continue;
            }
            if trimmed == PARAGRAPH_NOTE {
                paragraph_marked = true;
                in_note = true;
                continue;
            }
            if trimmed.starts_with("NOTE") || trimmed.starts_with("STYLE") || trimmed.starts_with("REGION") {
                in_note = true;
                continue;
            }
            match CUE_TIMING_REGEX.captures(trimmed) {
                Some(caps) => {
                    pending = Some(PendingCue {
                        start: parse_time(&caps[1])?,
                        end: parse_time(&caps[2])?,
                        region: caps.get(3).and_then(|m| region_from_settings(m.as_str())),
                        new_paragraph: paragraph_marked,
                        lines: Vec::new(),
                    });
                    paragraph_marked = false;
                }
                // Cue identifiers precede the timing line
                None => debug!("Skipping WebVTT cue identifier: {}", trimmed),
            }
        }
        flush(&mut track, pending.take());

        if track.is_empty() {
            return Err(ParseError::no_subtitles(FORMAT));
        }
        debug!("Parsed {} WebVTT cues", track.len());
        Ok(track)
    }

    fn generate(&self, track: &SubtitleTrack, _language_code: &str) -> String {
        let mut output = vec!["WEBVTT".to_string(), String::new()];
        for item in track.subtitle_items(Some(&MarkupMapping::webvtt())) {
            if item.meta.new_paragraph {
                output.push(PARAGRAPH_NOTE.to_string());
                output.push(String::new());
            }
            let mut timing = format!(
                "{} --> {}",
                ClockFormat::WEBVTT.format(item.start_time),
                ClockFormat::WEBVTT.format(item.end_time)
            );
            if item.meta.region.as_deref() == Some(REGION_TOP) {
                timing.push_str(" line:1");
            }
            output.push(timing);
            output.extend(cue_text_lines(&item.text));
            output.push(String::new());
        }
        output.join("\n")
    }
}
