/*!
 * Error types for the subcanon library.
 *
 * Each concern gets its own enum, defined with the thiserror crate. Format
 * adapters wrap every low-level failure into a `ParseError` that names the
 * format and keeps the original error as its source.
 */

use thiserror::Error;

/// Boxed low-level cause carried by parse errors
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the time expression algebra
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// The expression matches none of the clock, metric or tick grammars
    #[error("Invalid time expression: '{0}'")]
    InvalidExpression(String),

    /// A tick expression was found but the document declares no tick rate
    #[error("Tick expression '{0}' requires a tick rate")]
    MissingTickRate(String),

    /// The expression does not fit in a millisecond counter
    #[error("Time expression out of range: '{0}'")]
    Overflow(String),
}

/// Errors raised by the minimal XML reader
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// Input ended before the document was complete
    #[error("Unexpected end of document")]
    UnexpectedEof,

    /// Malformed markup at the given byte offset
    #[error("XML syntax error at byte {offset}: {message}")]
    Syntax {
        /// Byte offset in the input
        offset: usize,
        /// What went wrong
        message: String,
    },

    /// A closing tag does not match the open element
    #[error("Mismatched closing tag at byte {offset}: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        /// Byte offset in the input
        offset: usize,
        /// Name of the open element
        expected: String,
        /// Name found in the closing tag
        found: String,
    },

    /// No root element in the document
    #[error("Document has no root element")]
    NoRoot,
}

/// Errors that can occur while parsing a subtitle document
#[derive(Error, Debug)]
pub enum ParseError {
    /// The document structure is not what the format expects
    #[error("[{format}] malformed document: {message}")]
    Malformed {
        /// Format that was attempted
        format: String,
        /// Offending fragment or parser message
        message: String,
        /// Original low-level error, when there is one
        #[source]
        source: Option<BoxedCause>,
    },

    /// The document was readable but contained no cues
    #[error("[{format}] no subtitles found")]
    NoSubtitles {
        /// Format that was attempted
        format: String,
    },

    /// A time expression inside the document could not be read
    #[error("[{format}] invalid timing: {source}")]
    Time {
        /// Format that was attempted
        format: String,
        /// The time algebra error
        #[source]
        source: TimeError,
    },
}

impl ParseError {
    /// Malformed-document error without an underlying cause
    pub fn malformed(format: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            format: format.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Malformed-document error keeping the low-level cause
    pub fn caused_by<E>(format: &str, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Malformed {
            format: format.to_string(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn no_subtitles(format: &str) -> Self {
        Self::NoSubtitles {
            format: format.to_string(),
        }
    }

    pub fn time(format: &str, source: TimeError) -> Self {
        Self::Time {
            format: format.to_string(),
            source,
        }
    }

    /// Name of the format whose adapter raised the error
    pub fn format(&self) -> &str {
        match self {
            Self::Malformed { format, .. } => format,
            Self::NoSubtitles { format } => format,
            Self::Time { format, .. } => format,
        }
    }
}

/// Precondition violations from callers of the library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No adapter is registered under the requested name
    #[error("Unknown subtitle format: {0}")]
    UnknownFormat(String),

    /// Configuration values that fail validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from mutating a subtitle track
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// Cue index past the end of the track
    #[error("Cue index {index} out of range for track of {len} cues")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of cues in the track
        len: usize,
    },
}

/// Main error type that wraps all other errors
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Error from a format adapter
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error from the time algebra
    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    /// Error from format lookup or configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Error from track mutation
    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for SubtitleError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
