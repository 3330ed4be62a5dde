use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ParseError;
use crate::formats::SubtitleAdapter;
use crate::subtitle_track::{AppendOptions, SubtitleTrack};

// @module: JSON adapter

const FORMAT: &str = "json";

// @struct: Serialized cue, text is canonical markup
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonCue {
    #[serde(default)]
    start: Option<u64>,

    #[serde(default)]
    end: Option<u64>,

    #[serde(default)]
    text: String,

    // @field: 1-based display order
    #[serde(default)]
    position: usize,

    #[serde(default)]
    new_paragraph: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    region: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

/// JSON array of cue objects ordered by `position`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonAdapter;

impl SubtitleAdapter for JsonAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        let mut cues: Vec<JsonCue> = serde_json::from_str(raw)
            .map_err(|e| ParseError::caused_by(FORMAT, "invalid JSON data", e))?;
        cues.sort_by_key(|cue| cue.position);

        let mut track = SubtitleTrack::new(language_code);
        for cue in cues {
            track.append_with(
                cue.start,
                cue.end,
                &cue.text,
                AppendOptions::canonical()
                    .paragraph(cue.new_paragraph)
                    .region(cue.region)
                    .meta(cue.meta),
            );
        }

        if track.is_empty() {
            return Err(ParseError::no_subtitles(FORMAT));
        }
        debug!("Parsed {} JSON cues", track.len());
        Ok(track)
    }

    fn generate(&self, track: &SubtitleTrack, _language_code: &str) -> String {
        let cues: Vec<JsonCue> = track
            .subtitle_items(None)
            .into_iter()
            .enumerate()
            .map(|(idx, item)| JsonCue {
                start: item.start_time,
                end: item.end_time,
                text: item.text,
                position: idx + 1,
                new_paragraph: item.meta.new_paragraph,
                region: item.meta.region,
                meta: item.meta.extra,
            })
            .collect();
        // Serializing plain structs and maps cannot fail
        serde_json::to_string_pretty(&cues).unwrap_or_else(|_| "[]".to_string())
    }
}
