/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use subcanon::app_config::Config;
use subcanon::errors::ConfigurationError;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.default_language, "en");
    assert_eq!(config.xml_format_order, vec!["dfxp".to_string(), "youtube".to_string()]);
    assert_eq!(config.youtube.last_cue_duration_ms, 3000);
    assert_eq!(config.dfxp.region_id, "subtitle-area");
    assert_eq!(config.dfxp.style.color, "white");
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.default_language = "zz".to_string();
    assert!(config.validate().is_err());
    config.default_language = "pt-br".to_string();
    assert!(config.validate().is_ok());

    config.xml_format_order.clear();
    assert!(config.validate().is_err());
    config.xml_format_order = vec!["srt".to_string()];
    assert!(config.validate().is_err());
    config.xml_format_order = vec!["TTML".to_string()];
    assert!(config.validate().is_ok());

    config.youtube.last_cue_duration_ms = 0;
    assert!(config.validate().is_err());
    config.youtube.last_cue_duration_ms = 2000;

    config.dfxp.region_id = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_from_json_str_withPartialDocument_shouldFillDefaults() -> Result<()> {
    let config = Config::from_json_str(
        r#"{"default_language": "fr", "dfxp": {"style": {"color": "yellow"}}, "log_level": "debug"}"#,
    )?;
    assert_eq!(config.default_language, "fr");
    assert_eq!(config.dfxp.style.color, "yellow");
    assert_eq!(config.dfxp.style.font_size, "18px");
    assert_eq!(config.xml_format_order.len(), 2);
    Ok(())
}

#[test]
fn test_from_json_str_withInvalidValues_shouldFail() {
    assert!(Config::from_json_str("{ nope").is_err());
    assert!(Config::from_json_str(r#"{"xml_format_order": []}"#).is_err());
}

#[test]
fn test_from_file_withTempFile_shouldLoadConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"youtube": {"last_cue_duration_ms": 1500}}"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.youtube.last_cue_duration_ms, 1500);
    Ok(())
}

#[test]
fn test_from_file_withMissingFile_shouldMentionPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("missing.json");
    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("missing.json"));
    Ok(())
}

#[test]
fn test_layout_withConfiguredStyle_shouldCarryValues() {
    let mut config = Config::default();
    config.dfxp.title = "Show".to_string();
    config.dfxp.style.text_align = "left".to_string();
    let layout = config.dfxp.layout();
    assert_eq!(layout.default_title, "Show");
    assert_eq!(layout.text_align, "left");
    assert_eq!(layout.region_id, "subtitle-area");
}

#[test]
fn test_validate_withBadValue_shouldReturnInvalidConfiguration() {
    let mut config = Config::default();
    config.xml_format_order = vec!["srt".to_string()];
    match config.validate() {
        Err(ConfigurationError::Invalid(message)) => assert!(message.contains("srt")),
        other => panic!("Expected invalid configuration, got {:?}", other),
    }

    let mut config = Config::default();
    config.default_language = "zz".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().starts_with("Invalid configuration: default_language"));
}

#[test]
fn test_from_json_str_withUnknownField_shouldIgnoreIt() -> Result<()> {
    let config = Config::from_json_str(r#"{"log_level": "trace"}"#)?;
    assert_eq!(config, Config::default());
    Ok(())
}
