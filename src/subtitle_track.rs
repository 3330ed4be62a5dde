use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::diff;
use crate::errors::TrackError;
use crate::markup::{self, MarkupMapping, strip_control_chars};
use crate::time_expression::milliseconds_to_clock_string;
use crate::xml::escape_text;

// @module: Canonical subtitle track

// @const: Region hint for cues placed at the top of the frame
pub const REGION_TOP: &str = "top";

// @struct: Single cue in canonical form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cue {
    // @field: Start in ms, None when unsynced
    pub start_time: Option<u64>,

    // @field: End in ms, None when unsynced
    pub end_time: Option<u64>,

    // @field: Canonical markup
    pub text: String,

    // @field: Starts a new paragraph
    pub new_paragraph: bool,

    // @field: Placement hint
    pub region: Option<String>,

    // @field: Adapter passthrough data
    pub meta: Map<String, Value>,
}

impl Cue {
    /// Both times set and end after start
    pub fn is_synced(&self) -> bool {
        matches!((self.start_time, self.end_time), (Some(start), Some(end)) if end > start)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{} --> {}",
            milliseconds_to_clock_string(self.start_time),
            milliseconds_to_clock_string(self.end_time)
        )?;
        writeln!(f, "{}", self.text)
    }
}

// @struct: Per-line metadata handed to generators
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineMeta {
    pub new_paragraph: bool,
    pub region: Option<String>,
    pub extra: Map<String, Value>,
}

// @struct: Read projection of a cue
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubtitleLine {
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub text: String,
    pub meta: LineMeta,
}

/// Options for `SubtitleTrack::append_with`
#[derive(Debug, Clone)]
pub struct AppendOptions {
    pub new_paragraph: bool,
    pub region: Option<String>,
    pub meta: Option<Map<String, Value>>,
    /// Text is literal and must be escaped; when false it is already canonical
    pub escape: bool,
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self {
            new_paragraph: false,
            region: None,
            meta: None,
            escape: true,
        }
    }
}

impl AppendOptions {
    /// Options for text that is already canonical markup
    pub fn canonical() -> Self {
        Self {
            escape: false,
            ..Self::default()
        }
    }

    pub fn paragraph(mut self, new_paragraph: bool) -> Self {
        self.new_paragraph = new_paragraph;
        self
    }

    pub fn region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// An ordered list of cues plus track metadata
#[derive(Debug, Clone, Default)]
pub struct SubtitleTrack {
    language_code: String,
    title: Option<String>,
    description: Option<String>,
    cues: Vec<Cue>,
}

impl SubtitleTrack {
    /// Create an empty track
    pub fn new(language_code: &str) -> Self {
        Self {
            language_code: language_code.to_string(),
            ..Self::default()
        }
    }

    /// Build a track from `(start, end, text)` tuples of canonical markup
    pub fn from_list<I, S>(language_code: &str, items: I) -> Self
    where
        I: IntoIterator<Item = (Option<u64>, Option<u64>, S)>,
        S: AsRef<str>,
    {
        let mut track = Self::new(language_code);
        for (start, end, text) in items {
            track.append_with(start, end, text.as_ref(), AppendOptions::canonical());
        }
        track
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn set_language(&mut self, language_code: &str) {
        self.language_code = language_code.to_string();
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Append literal text
    pub fn append(&mut self, start: Option<u64>, end: Option<u64>, text: &str, new_paragraph: bool) {
        self.append_with(start, end, text, AppendOptions::default().paragraph(new_paragraph));
    }

    /// Append a cue. Literal text is escaped; canonical text is normalized
    /// so that unknown tags are dropped and `<br/>` becomes `<br>`.
    pub fn append_with(
        &mut self,
        start: Option<u64>,
        end: Option<u64>,
        text: &str,
        options: AppendOptions,
    ) {
        let text = if options.escape {
            escape_text(&strip_control_chars(text))
                .replace("\r\n", "<br>")
                .replace('\n', "<br>")
        } else {
            markup::sanitize_canonical(text)
        };

        self.cues.push(Cue {
            start_time: start,
            end_time: end,
            text,
            new_paragraph: options.new_paragraph || self.cues.is_empty(),
            region: options.region,
            meta: options.meta.unwrap_or_default(),
        });
    }

    /// Correct the timing of one cue; `None` leaves that bound untouched
    pub fn update(&mut self, index: usize, start: Option<u64>, end: Option<u64>) -> Result<(), TrackError> {
        let len = self.cues.len();
        let cue = self
            .cues
            .get_mut(index)
            .ok_or(TrackError::IndexOutOfRange { index, len })?;
        if start.is_some() {
            cue.start_time = start;
        }
        if end.is_some() {
            cue.end_time = end;
        }
        Ok(())
    }

    /// Every cue has a start and an end, and ends after it starts
    pub fn fully_synced(&self) -> bool {
        self.cues.iter().all(Cue::is_synced)
    }

    /// The read projection consumed by generators. With a mapping the text
    /// is rendered through it and trimmed; without one it is the canonical
    /// markup as stored.
    pub fn subtitle_items(&self, mappings: Option<&MarkupMapping>) -> Vec<SubtitleLine> {
        self.cues
            .iter()
            .map(|cue| SubtitleLine {
                start_time: cue.start_time,
                end_time: cue.end_time,
                text: match mappings {
                    Some(mapping) => markup::from_canonical(&cue.text, mapping).trim().to_string(),
                    None => cue.text.clone(),
                },
                meta: LineMeta {
                    new_paragraph: cue.new_paragraph,
                    region: cue.region.clone(),
                    extra: cue.meta.clone(),
                },
            })
            .collect()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

/// Tracks are equal when a diff finds no timing or text change
impl PartialEq for SubtitleTrack {
    fn eq(&self, other: &Self) -> bool {
        !diff::diff(self, other, None).changed
    }
}

impl<'a> IntoIterator for &'a SubtitleTrack {
    type Item = &'a Cue;
    type IntoIter = std::slice::Iter<'a, Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Track")?;
        writeln!(f, "Language: {}", self.language_code)?;
        if let Some(title) = &self.title {
            writeln!(f, "Title: {}", title)?;
        }
        writeln!(f, "Cues: {}", self.cues.len())?;
        Ok(())
    }
}
