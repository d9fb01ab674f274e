//! Unified error types for chatexport.
//!
//! This module provides a single [`ExportError`] enum that covers every
//! failure that aborts an export, plus [`RecordError`] for failures that are
//! confined to one message and recovered locally.
//!
//! # Error Handling Philosophy
//!
//! - **Fatal** errors ([`ExportError::Configuration`], [`ExportError::Transform`])
//!   abort the whole run. No partial document or manifest is returned.
//! - **Per-record** errors ([`RecordError`]) are logged and the affected
//!   message is rendered with a degraded body. They never abort the export.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::{AttachmentId, RecipientId};

/// A specialized [`Result`] type for chatexport operations.
///
/// # Example
///
/// ```rust
/// use chatexport::error::Result;
///
/// fn my_function() -> Result<String> {
///     Ok(String::new())
/// }
/// ```
pub type Result<T> = std::result::Result<T, ExportError>;

/// The error type for all fatal chatexport operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The snapshot file doesn't exist
    /// - Permission denied
    /// - Disk is full (when writing the document or a manifest)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The document builder could not be constructed.
    ///
    /// This occurs when:
    /// - A date pattern in [`ExportConfig`](crate::config::ExportConfig) is invalid
    /// - The UTC offset is out of range
    /// - The export window ends before it starts
    /// - The thread, its recipient or the self participant cannot be resolved
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of what's wrong
        message: String,
    },

    /// The finished document tree could not be serialized.
    #[error("Failed to serialize document: {message}")]
    Transform {
        /// Description of what's wrong
        message: String,
    },

    /// Failed to parse a conversation snapshot.
    #[cfg(feature = "json")]
    #[error("Failed to parse conversation snapshot{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Snapshot {
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// The input doesn't match the expected structure.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// Invalid date given for the export window.
    ///
    /// Window dates expect YYYY-MM-DD format.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A failure while rendering a single message.
///
/// These are recovered by the document builder: the message keeps its
/// `turn` and `message` elements but gets an empty `body`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A link preview references an attachment the lookup doesn't know.
    #[error("attachment {0} has no metadata")]
    MissingAttachment(AttachmentId),

    /// A quote author or mention target is unknown.
    #[error("participant {0} could not be resolved")]
    UnknownParticipant(RecipientId),
}

impl From<std::fmt::Error> for ExportError {
    fn from(_: std::fmt::Error) -> Self {
        ExportError::transform("formatter error while writing markup")
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ExportError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        ExportError::Configuration {
            message: message.into(),
        }
    }

    /// Creates a transform (serialization) error.
    pub fn transform(message: impl Into<String>) -> Self {
        ExportError::Transform {
            message: message.into(),
        }
    }

    /// Creates a snapshot parse error.
    #[cfg(feature = "json")]
    pub fn snapshot(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        ExportError::Snapshot { source, path }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ExportError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ExportError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ExportError::Io(_))
    }

    /// Returns `true` if the builder could not be constructed.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ExportError::Configuration { .. })
    }

    /// Returns `true` if the document could not be serialized.
    pub fn is_transform(&self) -> bool {
        matches!(self, ExportError::Transform { .. })
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, ExportError::InvalidDate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = ExportError::configuration("thread 7 not found");
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "Configuration error: thread 7 not found");
    }

    #[test]
    fn test_transform_from_fmt_error() {
        let err: ExportError = std::fmt::Error.into();
        assert!(err.is_transform());
    }

    #[test]
    fn test_invalid_date_display() {
        let err = ExportError::invalid_date("01-01-2024");
        assert!(err.is_invalid_date());
        let msg = err.to_string();
        assert!(msg.contains("01-01-2024"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_io_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: ExportError = io_err.into();
        assert!(err.is_io());
    }

    #[test]
    fn test_record_error_display() {
        assert_eq!(
            RecordError::MissingAttachment(42).to_string(),
            "attachment 42 has no metadata"
        );
        assert_eq!(
            RecordError::UnknownParticipant(9).to_string(),
            "participant 9 could not be resolved"
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_snapshot_error_includes_path() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ExportError::snapshot(json_err, Some(PathBuf::from("chat.json")));
        assert!(err.to_string().contains("(file: chat.json)"));
    }
}
