//! Error types for outliner library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for outliner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline extraction and ranking.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be decoded.
    #[error("Document is encrypted")]
    Encrypted,

    /// A document could not be decoded into text spans.
    ///
    /// Isolated to that document: the batch continues without it.
    #[error("Document '{document}' is unreadable: {reason}")]
    DocumentUnreadable {
        /// Document identifier (usually the file name)
        document: String,
        /// Underlying decoder failure
        reason: String,
    },

    /// A document exceeded the per-document processing time budget.
    #[error("Document '{document}' timed out after {secs}s")]
    Timeout {
        /// Document identifier
        document: String,
        /// Configured budget in seconds
        secs: u64,
    },

    /// The combined persona + job text is blank.
    #[error("Persona and job-to-be-done text is empty")]
    EmptyQuery,

    /// A heading pattern in the language configuration failed to compile.
    #[error("Invalid heading pattern for language '{language}': {pattern}")]
    InvalidPattern {
        /// Language code the pattern belongs to
        language: String,
        /// The offending pattern source
        pattern: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },

    /// Invalid configuration or input descriptor.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Embedding model could not be loaded or applied.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Error during rendering of output JSON.
    #[error("Rendering error: {0}")]
    Render(String),

    /// An output file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    OutputWriteFailure {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Whether this error only affects a single document and must not abort a batch.
    pub fn is_document_level(&self) -> bool {
        matches!(
            self,
            Error::DocumentUnreadable { .. }
                | Error::Timeout { .. }
                | Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
                | Error::OutputWriteFailure { .. }
        )
    }

    /// Wrap a decoder failure as [`Error::DocumentUnreadable`] for `document`.
    pub fn unreadable(document: impl Into<String>, err: Error) -> Self {
        match err {
            Error::DocumentUnreadable { .. } | Error::Timeout { .. } => err,
            other => Error::DocumentUnreadable {
                document: document.into(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::DocumentUnreadable {
            document: "a.pdf".to_string(),
            reason: "bad xref".to_string(),
        };
        assert_eq!(err.to_string(), "Document 'a.pdf' is unreadable: bad xref");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_unreadable_wraps_decoder_errors() {
        let err = Error::unreadable("x.pdf", Error::Encrypted);
        match err {
            Error::DocumentUnreadable { document, reason } => {
                assert_eq!(document, "x.pdf");
                assert_eq!(reason, "Document is encrypted");
            }
            other => panic!("unexpected {other:?}"),
        }

        let timeout = Error::Timeout {
            document: "y.pdf".to_string(),
            secs: 3,
        };
        assert!(matches!(
            Error::unreadable("y.pdf", timeout),
            Error::Timeout { .. }
        ));
    }

    #[test]
    fn test_document_level_classification() {
        assert!(Error::UnknownFormat.is_document_level());
        assert!(!Error::EmptyQuery.is_document_level());
        assert!(!Error::Config("missing dir".into()).is_document_level());
    }
}
