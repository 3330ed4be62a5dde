/*!
 * Tests for the SubRip adapter
 */

use anyhow::Result;
use subcanon::errors::ParseError;
use subcanon::formats::{SrtAdapter, SubtitleAdapter};
use subcanon::subtitle_track::SubtitleTrack;

use crate::common;

#[test]
fn test_parse_withSampleDocument_shouldReadEveryCue() -> Result<()> {
    common::init_logging();
    let track = SrtAdapter.parse(common::SAMPLE_SRT, "en")?;

    assert_eq!(track.len(), 3);
    assert_eq!(track.language_code(), "en");
    assert_eq!(track.cues()[0].start_time, Some(1000));
    assert_eq!(track.cues()[0].end_time, Some(4000));
    assert_eq!(track.cues()[0].text, "This is a <i>test</i> subtitle.");
    assert_eq!(track.cues()[1].text, "It contains<br>two lines.");
    assert_eq!(track.cues()[2].start_time, Some(10_000));
    Ok(())
}

#[test]
fn test_parse_withCrlfAndBom_shouldReadCues() -> Result<()> {
    let raw = "\u{feff}1\r\n00:00:01,500 --> 00:00:02,000\r\nHello\r\n\r\n";
    let track = SrtAdapter.parse(raw, "en")?;
    assert_eq!(track.len(), 1);
    assert_eq!(track.cues()[0].start_time, Some(1500));
    assert_eq!(track.cues()[0].text, "Hello");
    Ok(())
}

#[test]
fn test_parse_withMissingIndexAndPositionSettings_shouldStillReadCue() -> Result<()> {
    let raw = "00:00:01.000 --> 00:00:02.000 X1:10 X2:20\nNo index here\n";
    let track = SrtAdapter.parse(raw, "en")?;
    assert_eq!(track.len(), 1);
    assert_eq!(track.cues()[0].end_time, Some(2000));
    Ok(())
}

#[test]
fn test_parse_withStrayLines_shouldSkipThem() -> Result<()> {
    let raw = "garbage\n\n1\n00:00:01,000 --> 00:00:02,000\nKept\n";
    let track = SrtAdapter.parse(raw, "en")?;
    assert_eq!(track.len(), 1);
    assert_eq!(track.cues()[0].text, "Kept");
    Ok(())
}

#[test]
fn test_parse_withNoCues_shouldFail() {
    let err = SrtAdapter.parse("just some text\n", "en").unwrap_err();
    assert!(matches!(err, ParseError::NoSubtitles { .. }));
    assert_eq!(err.format(), "srt");
}

#[test]
fn test_parse_withInvalidTime_shouldFailWithTimeError() {
    let raw = "1\n00:75:00,000 --> 00:76:00,000\nBad\n";
    let err = SrtAdapter.parse(raw, "en").unwrap_err();
    assert!(matches!(err, ParseError::Time { .. }));
}

#[test]
fn test_generate_withStyledTrack_shouldWriteCrlfBlocks() {
    let track = common::styled_track();
    let output = SrtAdapter.generate(&track, "en");

    assert!(output.starts_with("1\r\n00:00:01,000 --> 00:00:02,500\r\n<b>Bold</b> and <i>italic</i>\r\n\r\n"));
    assert!(output.contains("2\r\n00:00:03,000 --> 00:00:04,500\r\nTwo\r\nlines\r\n\r\n"));
    assert!(output.contains("<u>word on <i>nested spans</i></u>"));
    assert!(output.contains("Fish & chips"));
}

#[test]
fn test_generate_withUnsyncedCue_shouldWriteSentinel() {
    let output = SrtAdapter.generate(&common::unsynced_track(), "en");
    assert!(output.contains("99:59:59,999 --> 99:59:59,999"));
}

#[test]
fn test_generate_withEmptyTrack_shouldWriteNothing() {
    assert_eq!(SrtAdapter.generate(&SubtitleTrack::new("en"), "en"), "");
}

#[test]
fn test_round_trip_withConsecutiveBreaks_shouldKeepWholeCue() -> Result<()> {
    let track = SubtitleTrack::from_list("en", vec![(Some(1000), Some(2000), "a<br><br>b")]);
    let output = SrtAdapter.generate(&track, "en");
    assert!(!output.contains("\r\n\r\nb"));

    let parsed = SrtAdapter.parse(&output, "en")?;
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.cues()[0].text, "a<br><br>b");
    Ok(())
}

#[test]
fn test_round_trip_withBreakTagOnItsOwnLine_shouldKeepEveryBreak() -> Result<()> {
    let raw = "1\n00:00:01,000 --> 00:00:02,000\na\n<br>\nb\n";
    let first = SrtAdapter.parse(raw, "en")?;
    assert_eq!(first.cues()[0].text, "a<br><br><br>b");

    let second = SrtAdapter.parse(&SrtAdapter.generate(&first, "en"), "en")?;
    assert!(first == second);
    Ok(())
}

#[test]
fn test_round_trip_withAngleBracketsInText_shouldKeepText() -> Result<()> {
    let mut track = SubtitleTrack::new("en");
    track.append(Some(1000), Some(2000), "if x<y and z>w", false);
    assert_eq!(track.cues()[0].text, "if x&lt;y and z&gt;w");

    let output = SrtAdapter.generate(&track, "en");
    assert!(output.contains("if x&lt;y and z&gt;w"));

    let parsed = SrtAdapter.parse(&output, "en")?;
    assert_eq!(parsed.cues()[0].text, "if x&lt;y and z&gt;w");
    Ok(())
}

#[test]
fn test_round_trip_withLiteralEntityText_shouldNotDecodeIt() -> Result<()> {
    let raw = "1\n00:00:01,000 --> 00:00:02,000\nwrite &amp;lt; for <\n";
    let first = SrtAdapter.parse(raw, "en")?;
    let second = SrtAdapter.parse(&SrtAdapter.generate(&first, "en"), "en")?;
    assert_eq!(second.cues()[0].text, first.cues()[0].text);
    Ok(())
}

#[test]
fn test_round_trip_withTimesPastNinetyNineHours_shouldStaySynced() -> Result<()> {
    let track = SubtitleTrack::from_list("en", vec![(Some(360_000_000), Some(360_500_000), "late")]);
    let output = SrtAdapter.generate(&track, "en");
    assert!(output.contains("100:00:00,000 --> 100:08:20,000"));

    let parsed = SrtAdapter.parse(&output, "en")?;
    assert_eq!(parsed.cues()[0].start_time, Some(360_000_000));
    assert_eq!(parsed.cues()[0].end_time, Some(360_500_000));
    Ok(())
}
