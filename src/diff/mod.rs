/*!
 * Track comparison.
 *
 * Two tracks are aligned cue by cue on their `(start, end, text)` tuples.
 * Change ratios are computed separately on the timing and on the text
 * projections, so an edit that only retimes cues leaves `text_changed` at 0.
 */

pub mod sequence_matcher;

use std::hash::Hash;

use crate::markup::MarkupMapping;
use crate::subtitle_track::{SubtitleLine, SubtitleTrack};
use sequence_matcher::{OpTag, SequenceMatcher};

/// One aligned pair of cues
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    pub time_changed: bool,
    pub text_changed: bool,
    /// Cue from each track; `None` where a cue was inserted or deleted
    pub subtitles: (Option<SubtitleLine>, Option<SubtitleLine>),
}

/// Outcome of comparing two tracks
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiffResult {
    pub changed: bool,
    /// Share of text entries not covered by the alignment, in [0, 1]
    pub text_changed: f64,
    /// Share of timing entries not covered by the alignment, in [0, 1]
    pub time_changed: f64,
    /// Aligned rows; empty when nothing changed
    pub subtitle_data: Vec<DiffRow>,
}

/// `1 - 2M/T` where M is the number of matched elements and T the combined length
pub fn calc_changes<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    let matched = SequenceMatcher::new(a, b).matched_count();
    (total - 2 * matched) as f64 / total as f64
}

fn paired_row(a: &SubtitleLine, b: &SubtitleLine) -> DiffRow {
    DiffRow {
        time_changed: a.start_time != b.start_time || a.end_time != b.end_time,
        text_changed: a.text != b.text,
        subtitles: (Some(a.clone()), Some(b.clone())),
    }
}

fn unpaired_row(a: Option<&SubtitleLine>, b: Option<&SubtitleLine>) -> DiffRow {
    DiffRow {
        time_changed: true,
        text_changed: true,
        subtitles: (a.cloned(), b.cloned()),
    }
}

/// Compare two tracks. `mappings` selects the text projection that is
/// compared; without one the canonical markup is used.
pub fn diff(a: &SubtitleTrack, b: &SubtitleTrack, mappings: Option<&MarkupMapping>) -> DiffResult {
    if a.is_empty() && b.is_empty() {
        return DiffResult::default();
    }

    let items_a = a.subtitle_items(mappings);
    let items_b = b.subtitle_items(mappings);

    let text_a: Vec<&str> = items_a.iter().map(|s| s.text.as_str()).collect();
    let text_b: Vec<&str> = items_b.iter().map(|s| s.text.as_str()).collect();
    let time_a: Vec<(Option<u64>, Option<u64>)> =
        items_a.iter().map(|s| (s.start_time, s.end_time)).collect();
    let time_b: Vec<(Option<u64>, Option<u64>)> =
        items_b.iter().map(|s| (s.start_time, s.end_time)).collect();

    let text_changed = calc_changes(&text_a, &text_b);
    let time_changed = calc_changes(&time_a, &time_b);
    if text_changed == 0.0 && time_changed == 0.0 {
        return DiffResult::default();
    }

    let tuples_a: Vec<(Option<u64>, Option<u64>, &str)> =
        items_a.iter().map(|s| (s.start_time, s.end_time, s.text.as_str())).collect();
    let tuples_b: Vec<(Option<u64>, Option<u64>, &str)> =
        items_b.iter().map(|s| (s.start_time, s.end_time, s.text.as_str())).collect();

    let mut subtitle_data = Vec::with_capacity(items_a.len().max(items_b.len()));
    for op in SequenceMatcher::new(&tuples_a, &tuples_b).opcodes() {
        let left = &items_a[op.i1..op.i2];
        let right = &items_b[op.j1..op.j2];
        match op.tag {
            OpTag::Equal | OpTag::Replace => {
                for idx in 0..left.len().max(right.len()) {
                    match (left.get(idx), right.get(idx)) {
                        (Some(x), Some(y)) => subtitle_data.push(paired_row(x, y)),
                        (x, y) => subtitle_data.push(unpaired_row(x, y)),
                    }
                }
            }
            OpTag::Delete => subtitle_data.extend(left.iter().map(|x| unpaired_row(Some(x), None))),
            OpTag::Insert => subtitle_data.extend(right.iter().map(|y| unpaired_row(None, Some(y)))),
        }
    }

    DiffResult {
        changed: true,
        text_changed,
        time_changed,
        subtitle_data,
    }
}
