/*!
 * Tests for error types and conversions
 */

use std::error::Error;

use subcanon::errors::{
    ConfigurationError, ParseError, SubtitleError, TimeError, TrackError, XmlError,
};

#[test]
fn test_timeError_invalidExpression_shouldDisplayCorrectly() {
    let error = TimeError::InvalidExpression("12x".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Invalid time expression"));
    assert!(display.contains("12x"));
}

#[test]
fn test_parseError_time_shouldNameFormatAndKeepSource() {
    let error = ParseError::time("srt", TimeError::MissingTickRate("5t".to_string()));
    assert_eq!(error.format(), "srt");
    let display = format!("{}", error);
    assert!(display.contains("[srt]"));
    assert!(display.contains("5t"));
    assert!(error.source().is_some());
}

#[test]
fn test_parseError_causedBy_shouldExposeUnderlyingError() {
    let error = ParseError::caused_by("dfxp", "invalid XML document", XmlError::UnexpectedEof);
    let display = format!("{}", error);
    assert!(display.contains("[dfxp] malformed document: invalid XML document"));

    let source = error.source().expect("source should be kept");
    assert_eq!(source.to_string(), "Unexpected end of document");
}

#[test]
fn test_parseError_malformed_shouldHaveNoSource() {
    let error = ParseError::malformed("youtube", "expected <transcript> root");
    assert!(error.source().is_none());
    assert_eq!(error.format(), "youtube");
}

#[test]
fn test_parseError_noSubtitles_shouldDisplayCorrectly() {
    let error = ParseError::no_subtitles("vtt");
    assert_eq!(format!("{}", error), "[vtt] no subtitles found");
}

#[test]
fn test_xmlError_mismatchedTag_shouldDisplayBothNames() {
    let error = XmlError::MismatchedTag {
        offset: 12,
        expected: "p".to_string(),
        found: "div".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("byte 12"));
    assert!(display.contains("</p>"));
    assert!(display.contains("</div>"));
}

#[test]
fn test_trackError_indexOutOfRange_shouldDisplayIndexAndLength() {
    let error = TrackError::IndexOutOfRange { index: 7, len: 3 };
    let display = format!("{}", error);
    assert!(display.contains('7'));
    assert!(display.contains('3'));
}

#[test]
fn test_subtitleError_fromParts_shouldWrapCorrectly() {
    let parse: SubtitleError = ParseError::no_subtitles("srt").into();
    assert!(matches!(parse, SubtitleError::Parse(_)));
    assert!(parse.to_string().starts_with("Parse error:"));

    let config: SubtitleError = ConfigurationError::UnknownFormat("doc".to_string()).into();
    assert!(config.to_string().contains("Unknown subtitle format: doc"));

    let time: SubtitleError = TimeError::Overflow("1e30s".to_string()).into();
    assert!(matches!(time, SubtitleError::Time(_)));

    let track: SubtitleError = TrackError::IndexOutOfRange { index: 1, len: 0 }.into();
    assert!(matches!(track, SubtitleError::Track(_)));
}

#[test]
fn test_subtitleError_fromAnyhow_shouldBecomeUnknown() {
    let error: SubtitleError = anyhow::anyhow!("something odd").into();
    assert!(matches!(error, SubtitleError::Unknown(_)));
    assert!(error.to_string().contains("something odd"));
}

#[test]
fn test_configurationError_invalid_shouldDisplayMessage() {
    let error: SubtitleError = ConfigurationError::Invalid("dfxp.region_id must not be empty".to_string()).into();
    assert!(matches!(error, SubtitleError::Configuration(ConfigurationError::Invalid(_))));
    assert_eq!(
        error.to_string(),
        "Configuration error: Invalid configuration: dfxp.region_id must not be empty"
    );
}
