/*!
 * Tests for the WebVTT adapter
 */

use anyhow::Result;
use subcanon::errors::ParseError;
use subcanon::formats::webvtt::region_from_settings;
use subcanon::formats::{SubtitleAdapter, WebVttAdapter};
use subcanon::subtitle_track::{AppendOptions, REGION_TOP, SubtitleTrack};

use crate::common;

const SAMPLE_VTT: &str = "WEBVTT - sample

STYLE
::cue { color: yellow }

NOTE this comment
spans two lines

intro
00:01.000 --> 00:02.500 line:0
<v Speaker>Hello</v> <b>there</b>

NOTE Paragraph

00:00:03.000 --> 00:00:04.000 align:start
{\\an8}Second <00:00:03.500>cue

00:00:05.000 --> 00:00:06.000 line:80%
Bottom & done
";

#[test]
fn test_parse_withSampleDocument_shouldSkipBlocksAndReadCues() -> Result<()> {
    common::init_logging();
    let track = WebVttAdapter.parse(SAMPLE_VTT, "en")?;

    assert_eq!(track.len(), 3);
    let first = &track.cues()[0];
    assert_eq!(first.start_time, Some(1000));
    assert_eq!(first.end_time, Some(2500));
    assert_eq!(first.text, "Hello <b>there</b>");
    assert_eq!(first.region.as_deref(), Some(REGION_TOP));

    let second = &track.cues()[1];
    assert!(second.new_paragraph);
    assert_eq!(second.text, "Second cue");
    assert!(second.region.is_none());

    let third = &track.cues()[2];
    assert!(!third.new_paragraph);
    assert!(third.region.is_none());
    assert_eq!(third.text, "Bottom &amp; done");
    Ok(())
}

#[test]
fn test_parse_withoutHeader_shouldStillReadCues() -> Result<()> {
    let track = WebVttAdapter.parse("00:00:01.000 --> 00:00:02.000\nHi\n", "en")?;
    assert_eq!(track.len(), 1);
    Ok(())
}

#[test]
fn test_parse_withHeaderOnly_shouldFail() {
    let err = WebVttAdapter.parse("WEBVTT\n\n", "en").unwrap_err();
    assert!(matches!(err, ParseError::NoSubtitles { .. }));
    assert_eq!(err.format(), "vtt");
}

#[test]
fn test_region_from_settings_withLineValues_shouldDetectTop() {
    assert_eq!(region_from_settings("line:0").as_deref(), Some(REGION_TOP));
    assert_eq!(region_from_settings("align:start line:10%").as_deref(), Some(REGION_TOP));
    assert_eq!(region_from_settings("line:5,start").as_deref(), Some(REGION_TOP));
    assert_eq!(region_from_settings("line:-1"), None);
    assert_eq!(region_from_settings("line:85%"), None);
    assert_eq!(region_from_settings("position:10%"), None);
}

#[test]
fn test_generate_withParagraphsAndRegion_shouldWriteNotesAndSettings() {
    let mut track = SubtitleTrack::new("en");
    track.append(Some(1000), Some(2000), "Fish & chips", false);
    track.append_with(
        Some(3000),
        Some(4000),
        "<i>top</i>",
        AppendOptions::canonical()
            .paragraph(true)
            .region(Some(REGION_TOP.to_string())),
    );

    let output = WebVttAdapter.generate(&track, "en");
    let expected = "WEBVTT\n\nNOTE Paragraph\n\n00:00:01.000 --> 00:00:02.000\nFish &amp; chips\n\nNOTE Paragraph\n\n00:00:03.000 --> 00:00:04.000 line:1\n<i>top</i>\n";
    assert_eq!(output, expected);
}

#[test]
fn test_generate_withUnsyncedTrack_shouldWriteSentinel() {
    let output = WebVttAdapter.generate(&common::unsynced_track(), "en");
    assert!(output.contains("99:59:59.999 --> 99:59:59.999"));
}

#[test]
fn test_round_trip_withConsecutiveBreaks_shouldKeepWholeCue() -> Result<()> {
    let track = SubtitleTrack::from_list(
        "en",
        vec![
            (Some(1000), Some(2000), "a<br><br>b"),
            (Some(3000), Some(4000), "after"),
        ],
    );
    let output = WebVttAdapter.generate(&track, "en");
    assert!(output.contains("00:00:01.000 --> 00:00:02.000\na<br>\nb\n"));

    let parsed = WebVttAdapter.parse(&output, "en")?;
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed.cues()[0].text, "a<br><br>b");
    assert_eq!(parsed.cues()[1].text, "after");
    Ok(())
}
