/*!
 * Common test utilities for the subcanon test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use subcanon::SubtitleTrack;

/// Route library logs through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Four synced cues with distinct timings and texts
pub fn four_cue_track() -> SubtitleTrack {
    SubtitleTrack::from_list(
        "en",
        vec![
            (Some(1000), Some(2000), "First line"),
            (Some(2500), Some(4000), "Second line"),
            (Some(4500), Some(6000), "Third line"),
            (Some(6500), Some(8000), "Fourth line"),
        ],
    )
}

/// A track exercising styling, breaks, escaping and placement
pub fn styled_track() -> SubtitleTrack {
    SubtitleTrack::from_list(
        "en",
        vec![
            (Some(1000), Some(2500), "<b>Bold</b> and <i>italic</i>"),
            (Some(3000), Some(4500), "Two<br>lines"),
            (Some(5000), Some(6500), "<u>word on <i>nested spans</i></u>"),
            (Some(7000), Some(8500), "Fish &amp; chips"),
        ],
    )
}

/// A track whose cues have no timing yet
pub fn unsynced_track() -> SubtitleTrack {
    SubtitleTrack::from_list(
        "en",
        vec![
            (None, None, "Not timed yet"),
            (None, None, "Neither is this"),
        ],
    )
}

/// Sample SubRip document
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a <i>test</i> subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains
two lines.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

/// Sample TTML document with named styles, tick timing and a duration
pub const SAMPLE_TTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tt xmlns="http://www.w3.org/ns/ttml" xmlns:tts="http://www.w3.org/ns/ttml#styling"
    xmlns:ttm="http://www.w3.org/ns/ttml#metadata" xmlns:ttp="http://www.w3.org/ns/ttml#parameter"
    ttp:tickRate="10000000" xml:lang="en">
  <head>
    <metadata>
      <ttm:title>Sample</ttm:title>
    </metadata>
    <styling>
      <style xml:id="s1" tts:fontWeight="bold"/>
      <style xml:id="s2" tts:color="yellow"/>
    </styling>
  </head>
  <body>
    <div>
      <p begin="00:00:01.000" end="00:00:02.500">Plain <span style="s1">named bold</span></p>
      <p begin="30000000t" dur="1.5s">Tick <span tts:fontStyle="italic">inline</span></p>
    </div>
    <div>
      <p begin="5s" end="6500ms" region="top">Second<br/>paragraph</p>
    </div>
  </body>
</tt>
"#;
