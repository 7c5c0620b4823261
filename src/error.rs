//! Error types for document translation.
//!
//! Every failure is terminal for the current request: nothing here is retried
//! or swallowed by the core. The four request-level kinds map to the moments a
//! job can fail: dispatch, open, translate, and serialize.

/// Result type alias for translation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while translating a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File extension is not one of docx, pptx, pdf
    #[error("Unsupported format: '{0}' (expected .docx, .pptx or .pdf)")]
    UnsupportedFormat(String),

    /// The codec could not open the uploaded bytes as a container of its type
    #[error("Malformed {format} container: {reason}")]
    MalformedContainer {
        /// Container format being opened
        format: &'static str,
        /// What went wrong
        reason: String,
    },

    /// The translation bridge failed for some run, paragraph or shape
    #[error("Translation failed: {0}")]
    TranslationFailure(String),

    /// The mutated document could not be written back to bytes
    #[error("Failed to serialize {format} container: {reason}")]
    SerializationFailure {
        /// Container format being written
        format: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Target language could not be parsed
    #[error("Invalid target language: '{0}'")]
    InvalidLanguage(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::MalformedContainer`] from any displayable cause.
    pub fn malformed(format: &'static str, reason: impl std::fmt::Display) -> Self {
        Error::MalformedContainer {
            format,
            reason: reason.to_string(),
        }
    }

    /// Build a [`Error::SerializationFailure`] from any displayable cause.
    pub fn serialization(format: &'static str, reason: impl std::fmt::Display) -> Self {
        Error::SerializationFailure {
            format,
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable kind, used by the CLI and in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::MalformedContainer { .. } => "malformed_container",
            Error::TranslationFailure(_) => "translation_failure",
            Error::SerializationFailure { .. } => "serialization_failure",
            Error::InvalidLanguage(_) => "invalid_language",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
        }
    }

    /// Whether the error ends the current request.
    ///
    /// Always true for the request-level kinds; the core never retries.
    /// Only an outer layer such as a retrying translator may decide to try a
    /// failed call again.
    pub fn is_terminal(&self) -> bool {
        match self {
            Error::UnsupportedFormat(_)
            | Error::MalformedContainer { .. }
            | Error::TranslationFailure(_)
            | Error::SerializationFailure { .. } => true,
            Error::InvalidLanguage(_) | Error::Config(_) | Error::Io(_) => true,
        }
    }
}
