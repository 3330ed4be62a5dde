use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::ConfigurationError;
use crate::formats::dfxp::TtmlLayout;
use crate::formats::youtube::DEFAULT_LAST_CUE_DURATION_MS;

/// Library configuration module
/// This module handles the conversion settings: which adapters the `xml`
/// name resolves to, YouTube duration inference and the look of generated
/// TTML/DFXP documents.
/// Represents the library configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Language assigned to parsed tracks when the caller gives none
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Formats tried, in order, for the ambiguous `xml` name
    #[serde(default = "default_xml_format_order")]
    pub xml_format_order: Vec<String>,

    /// YouTube transcript settings
    #[serde(default)]
    pub youtube: YoutubeConfig,

    /// TTML/DFXP generation settings
    #[serde(default)]
    pub dfxp: DfxpConfig,
}

/// YouTube transcript settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct YoutubeConfig {
    // @field: Duration of a final cue without `dur`
    #[serde(default = "default_last_cue_duration_ms")]
    pub last_cue_duration_ms: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            last_cue_duration_ms: default_last_cue_duration_ms(),
        }
    }
}

/// TTML/DFXP document settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DfxpConfig {
    // @field: Title written when a track has none
    #[serde(default = "String::new")]
    pub title: String,

    // @field: Description written when a track has none
    #[serde(default = "String::new")]
    pub description: String,

    // @field: Id of the default region
    #[serde(default = "default_region_id")]
    pub region_id: String,

    // @field: Default text style
    #[serde(default)]
    pub style: DfxpStyleConfig,
}

impl Default for DfxpConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            region_id: default_region_id(),
            style: DfxpStyleConfig::default(),
        }
    }
}

impl DfxpConfig {
    /// Layout handed to the TTML/DFXP writers
    pub fn layout(&self) -> TtmlLayout {
        TtmlLayout {
            region_id: self.region_id.clone(),
            color: self.style.color.clone(),
            font_family: self.style.font_family.clone(),
            font_size: self.style.font_size.clone(),
            text_align: self.style.text_align.clone(),
            background_color: self.style.background_color.clone(),
            default_title: self.title.clone(),
            default_description: self.description.clone(),
            ..TtmlLayout::default()
        }
    }
}

/// Default style of generated TTML/DFXP documents
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DfxpStyleConfig {
    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default = "default_font_size")]
    pub font_size: String,

    #[serde(default = "default_text_align")]
    pub text_align: String,

    #[serde(default = "default_background_color")]
    pub background_color: String,
}

impl Default for DfxpStyleConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            text_align: default_text_align(),
            background_color: default_background_color(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_xml_format_order() -> Vec<String> {
    vec!["dfxp".to_string(), "youtube".to_string()]
}

fn default_last_cue_duration_ms() -> u64 {
    DEFAULT_LAST_CUE_DURATION_MS
}

fn default_region_id() -> String {
    "subtitle-area".to_string()
}

fn default_color() -> String {
    "white".to_string()
}

fn default_font_family() -> String {
    "proportionalSansSerif".to_string()
}

fn default_font_size() -> String {
    "18px".to_string()
}

fn default_text_align() -> String {
    "center".to_string()
}

fn default_background_color() -> String {
    "black".to_string()
}

// Formats the `xml` name may resolve to
const XML_CANDIDATES: &[&str] = &["dfxp", "ttml", "youtube"];

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        crate::language_utils::validate_language_code(&self.default_language)
            .map_err(|e| ConfigurationError::Invalid(format!("default_language: {}", e)))?;

        if self.xml_format_order.is_empty() {
            return Err(ConfigurationError::Invalid(
                "xml_format_order must name at least one format".to_string(),
            ));
        }
        for name in &self.xml_format_order {
            if !XML_CANDIDATES.contains(&name.to_lowercase().as_str()) {
                return Err(ConfigurationError::Invalid(format!(
                    "Format '{}' cannot be used for xml documents",
                    name
                )));
            }
        }

        if self.youtube.last_cue_duration_ms == 0 {
            return Err(ConfigurationError::Invalid(
                "youtube.last_cue_duration_ms must be greater than zero".to_string(),
            ));
        }

        if self.dfxp.region_id.trim().is_empty() {
            return Err(ConfigurationError::Invalid("dfxp.region_id must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_language: default_language(),
            xml_format_order: default_xml_format_order(),
            youtube: YoutubeConfig::default(),
            dfxp: DfxpConfig::default(),
        }
    }
}
