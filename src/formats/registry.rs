use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::{ConfigurationError, ParseError, SubtitleError};
use crate::formats::{
    DfxpAdapter, HtmlAdapter, JsonAdapter, SbvAdapter, SrtAdapter, SsaAdapter, SubtitleAdapter,
    TtmlAdapter, TxtAdapter, WebVttAdapter, YoutubeAdapter,
};
use crate::subtitle_track::SubtitleTrack;

// @module: Format name to adapter lookup

/// Case-insensitive map from format name to adapters.
///
/// A name may resolve to several adapters: parsing tries them in order and
/// returns the first success, generation uses the first one.
#[derive(Debug, Default, Clone)]
pub struct FormatRegistry {
    adapters: BTreeMap<String, Vec<Arc<dyn SubtitleAdapter>>>,
}

impl FormatRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in format with default settings
    pub fn with_default_formats() -> Self {
        Self::from_config(&Config::default())
    }

    /// Every built-in format, configured from `config`
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        let layout = config.dfxp.layout();
        let dfxp: Arc<dyn SubtitleAdapter> = Arc::new(DfxpAdapter::new(layout.clone()));
        let ttml: Arc<dyn SubtitleAdapter> = Arc::new(TtmlAdapter::new(layout));
        let youtube: Arc<dyn SubtitleAdapter> = Arc::new(YoutubeAdapter {
            last_cue_duration_ms: config.youtube.last_cue_duration_ms,
        });

        registry.register(Arc::new(SrtAdapter));
        registry.register(Arc::new(SbvAdapter));
        registry.register(Arc::new(SsaAdapter));
        registry.register(Arc::new(WebVttAdapter));
        registry.register(Arc::new(TxtAdapter));
        registry.register(Arc::new(JsonAdapter));
        registry.register(Arc::new(HtmlAdapter));
        registry.register(Arc::clone(&youtube));
        registry.register(Arc::clone(&dfxp));
        registry.register(Arc::clone(&ttml));

        for name in &config.xml_format_order {
            match name.to_lowercase().as_str() {
                "dfxp" => registry.register_alias("xml", Arc::clone(&dfxp)),
                "ttml" => registry.register_alias("xml", Arc::clone(&ttml)),
                "youtube" => registry.register_alias("xml", Arc::clone(&youtube)),
                other => debug!("Skipping unknown xml format '{}'", other),
            }
        }
        registry
    }

    /// Register an adapter under each of its file types
    pub fn register(&mut self, adapter: Arc<dyn SubtitleAdapter>) {
        for file_type in adapter.file_types() {
            self.register_alias(file_type, Arc::clone(&adapter));
        }
    }

    /// Register an adapter under an additional name, after any existing ones
    pub fn register_alias(&mut self, name: &str, adapter: Arc<dyn SubtitleAdapter>) {
        self.adapters
            .entry(name.to_lowercase())
            .or_default()
            .push(adapter);
    }

    /// All adapters registered under `name`, in trial order
    pub fn lookup_all(&self, name: &str) -> Result<&[Arc<dyn SubtitleAdapter>], ConfigurationError> {
        self.adapters
            .get(&name.trim().to_lowercase())
            .map(Vec::as_slice)
            .filter(|adapters| !adapters.is_empty())
            .ok_or_else(|| ConfigurationError::UnknownFormat(name.to_string()))
    }

    /// The primary adapter registered under `name`
    pub fn lookup(&self, name: &str) -> Result<&dyn SubtitleAdapter, ConfigurationError> {
        self.lookup_all(name)
            .map(|adapters| adapters[0].as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup_all(name).is_ok()
    }

    /// Registered names, sorted
    pub fn available_formats(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    /// Parse with every adapter for `format` until one succeeds. The error
    /// of the first adapter is returned when all of them fail.
    pub fn parse(&self, format: &str, raw: &str, language_code: &str) -> Result<SubtitleTrack, SubtitleError> {
        let mut first_error: Option<ParseError> = None;
        for adapter in self.lookup_all(format)? {
            match adapter.parse(raw, language_code) {
                Ok(track) => return Ok(track),
                Err(e) => {
                    debug!("{} adapter could not parse {} input: {}", adapter.name(), format, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Err(ConfigurationError::UnknownFormat(format.to_string()).into()),
        }
    }

    /// Generate `format` output from a track
    pub fn generate(&self, format: &str, track: &SubtitleTrack, language_code: &str) -> Result<String, SubtitleError> {
        Ok(self.lookup(format)?.generate(track, language_code))
    }

    /// Parse `raw` as `from` and generate it as `to`
    pub fn convert(&self, raw: &str, from: &str, to: &str, language_code: &str) -> Result<String, SubtitleError> {
        let generator = self.lookup(to)?;
        let track = self.parse(from, raw, language_code)?;
        Ok(generator.generate(&track, language_code))
    }
}
