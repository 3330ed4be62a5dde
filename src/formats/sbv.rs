use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ParseError;
use crate::formats::{SubtitleAdapter, normalize_newlines};
use crate::markup::{MarkupMapping, NativeMarkup, StyleMap, to_canonical};
use crate::subtitle_track::{AppendOptions, SubtitleTrack};
use crate::time_expression::ClockFormat;

// @module: YouTube SBV adapter

// @const: `H:MM:SS.mmm,H:MM:SS.mmm`
static SBV_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}:\d{2}:\d{2}\.\d{1,3}),(\d{1,2}:\d{2}:\d{2}\.\d{1,3})$")
        .expect("Invalid SBV timing regex")
});

const FORMAT: &str = "sbv";

/// SBV: timing line followed by text lines, `[br]` for forced breaks
#[derive(Debug, Default, Clone, Copy)]
pub struct SbvAdapter;

type PendingCue<'a> = (Option<u64>, Option<u64>, Vec<&'a str>);

fn flush(track: &mut SubtitleTrack, cue: Option<PendingCue<'_>>) {
    if let Some((start, end, lines)) = cue {
        let text = to_canonical(NativeMarkup::Sbv(&lines.join("\n")), &StyleMap::default());
        track.append_with(start, end, &text, AppendOptions::canonical());
    }
}

impl SubtitleAdapter for SbvAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["sbv"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        let content = normalize_newlines(raw);
        let mut track = SubtitleTrack::new(language_code);
        let mut current: Option<PendingCue<'_>> = None;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                flush(&mut track, current.take());
                continue;
            }
            if let Some((_, _, lines)) = current.as_mut() {
                lines.push(trimmed);
                continue;
            }
            match SBV_TIMING_REGEX.captures(trimmed) {
                Some(caps) => {
                    let start = ClockFormat::SBV
                        .parse(&caps[1])
                        .map_err(|e| ParseError::time(FORMAT, e))?;
                    let end = ClockFormat::SBV
                        .parse(&caps[2])
                        .map_err(|e| ParseError::time(FORMAT, e))?;
                    current = Some((start, end, Vec::new()));
                }
                // Header lines such as DELAY are not supported
                None => warn!("Ignoring SBV line outside a cue: {}", trimmed),
            }
        }
        flush(&mut track, current.take());

        if track.is_empty() {
            return Err(ParseError::no_subtitles(FORMAT));
        }
        debug!("Parsed {} SBV cues", track.len());
        Ok(track)
    }

    fn generate(&self, track: &SubtitleTrack, _language_code: &str) -> String {
        let mut output = Vec::new();
        for item in track.subtitle_items(Some(&MarkupMapping::sbv())) {
            output.push(format!(
                "{},{}",
                ClockFormat::SBV.format(item.start_time),
                ClockFormat::SBV.format(item.end_time)
            ));
            output.push(item.text);
            output.push(String::new());
        }
        output.join("\r\n")
    }
}
