use thiserror::Error;

/// Main error type for TTML track construction.
///
/// Every variant is fatal to [`crate::TtmlTrack::build`]: no partial track is
/// ever returned.
#[derive(Error, Debug)]
pub enum TtmlError {
    /// Two documents of the same track declare different `xml:lang` values
    #[error("Inconsistent language in document {document}: expected '{expected}', found '{found}'")]
    InconsistentLanguage {
        document: usize,
        expected: String,
        found: String,
    },

    /// A timed element carries a time expression that cannot be parsed
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    /// A structural query could not be evaluated against a document
    #[error("Query evaluation failed: {0}")]
    QueryEvaluation(String),

    /// An image reference could not be resolved against the document base URI
    #[error("Cannot resolve resource '{reference}': {reason}")]
    ResourceResolution { reference: String, reason: String },

    /// Retrieving the bytes of a resolved resource failed
    #[error("Cannot fetch resource {location}: {reason}")]
    ResourceFetch { location: String, reason: String },

    /// A document ends before the running start time of the track
    #[error("Negative duration in document {document}: ends at {end_ms}ms, track is already at {start_ms}ms")]
    NegativeDuration {
        document: usize,
        start_ms: i64,
        end_ms: i64,
    },

    /// A track needs at least one document
    #[error("No documents to build a track from")]
    NoDocuments,

    /// The XML source is not well formed
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid configuration value or unreadable configuration file
    #[error("Configuration error: {0}")]
    Config(String),

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for TtmlError {
    fn from(e: quick_xml::Error) -> Self {
        TtmlError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for TtmlError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        TtmlError::Xml(e.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TtmlError>;
