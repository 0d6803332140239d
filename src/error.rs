//! Unified error types for ichatpack.
//!
//! This module provides a single [`IchatError`] enum that covers all error
//! cases in the library, following the same pattern as `reqwest`,
//! `serde_json`, and `csv`.
//!
//! # Failure Taxonomy
//!
//! - **Per-file** failures ([`IchatError::Structural`]) mean one archive did
//!   not have the shape the normalizer relies on. They abort only that file.
//! - **Batch** failures ([`IchatError::InvalidFilename`],
//!   [`IchatError::NameGroups`], [`IchatError::DuplicateFiles`]) point at a
//!   configuration problem and block the whole run.
//! - Parsing is deterministic, so nothing here is retryable.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for ichatpack operations.
///
/// # Example
///
/// ```rust
/// use ichatpack::error::Result;
/// use ichatpack::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, IchatError>;

/// The error type for all ichatpack operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IchatError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The archive file doesn't exist
    /// - Permission denied
    /// - Disk is full (when writing output)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An archive did not have the structure the normalizer depends on.
    ///
    /// Carries the originating file (when known) and the offending content
    /// so the failing rule can be diagnosed.
    #[error(
        "Structural violation{}: {message}{}",
        file.as_ref().map(|f| format!(" in {f}")).unwrap_or_default(),
        content.as_ref().map(|c| format!(" (content: {c:?})")).unwrap_or_default()
    )]
    Structural {
        /// File name of the archive being parsed, if known
        file: Option<String>,
        /// Description of the violated expectation
        message: String,
        /// The offending line or value
        content: Option<String>,
    },

    /// A file name did not carry the other participant's identifier.
    #[error("Cannot extract participant from file name '{name}': {reason}")]
    InvalidFilename {
        /// The file name that failed to match
        name: String,
        /// Which expectation failed
        reason: &'static str,
    },

    /// The name-group table is malformed.
    ///
    /// The alias sets of different canonical names must be pairwise disjoint.
    #[error("Invalid name groups: {message}")]
    NameGroups {
        /// Description of what's wrong
        message: String,
    },

    /// Duplicate-numbered archive files without their base file.
    #[error("Found duplicate archive files whose base doesn't appear: {}", bases.join(", "))]
    DuplicateFiles {
        /// Base names that are missing
        bases: Vec<String>,
    },

    /// The input doesn't match an expected format.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// The external property-list converter failed.
    #[error("Converter failed for {}: {message}", path.display())]
    Converter {
        /// The archive being converted
        path: PathBuf,
        /// Exit status or spawn failure
        message: String,
    },

    /// Invalid date format in filter configuration.
    ///
    /// Date filters expect YYYY-MM-DD format.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// Invalid search pattern.
    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Directory walk error.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing/serialization error.
    ///
    /// This can occur when loading name groups or configuration, or when
    /// writing JSON output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error in {context}: {source}")]
    Utf8 {
        /// Description of where the error occurred
        context: String,
        /// The underlying UTF-8 error
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl From<std::string::FromUtf8Error> for IchatError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        IchatError::Utf8 {
            context: "output conversion".to_string(),
            source: err,
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl IchatError {
    /// Creates a structural violation without file context.
    ///
    /// The parser attaches the file name with [`in_file`](Self::in_file).
    pub fn structural(message: impl Into<String>, content: impl Into<String>) -> Self {
        IchatError::Structural {
            file: None,
            message: message.into(),
            content: Some(content.into()),
        }
    }

    /// Creates a structural violation that has no single offending value.
    pub fn structural_message(message: impl Into<String>) -> Self {
        IchatError::Structural {
            file: None,
            message: message.into(),
            content: None,
        }
    }

    /// Attaches the originating file name to a structural violation.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn in_file(self, name: impl Into<String>) -> Self {
        match self {
            IchatError::Structural {
                file: None,
                message,
                content,
            } => IchatError::Structural {
                file: Some(name.into()),
                message,
                content,
            },
            other => other,
        }
    }

    /// Creates a file name extraction error.
    pub fn invalid_filename(name: impl Into<String>, reason: &'static str) -> Self {
        IchatError::InvalidFilename {
            name: name.into(),
            reason,
        }
    }

    /// Creates a name-group table error.
    pub fn name_groups(message: impl Into<String>) -> Self {
        IchatError::NameGroups {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        IchatError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates a converter error.
    pub fn converter(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        IchatError::Converter {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        IchatError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, IchatError::Io(_))
    }

    /// Returns `true` if this is a per-file structural violation.
    pub fn is_structural(&self) -> bool {
        matches!(self, IchatError::Structural { .. })
    }

    /// Returns `true` if this error should stop the whole batch rather than
    /// a single file.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            IchatError::InvalidFilename { .. }
                | IchatError::NameGroups { .. }
                | IchatError::DuplicateFiles { .. }
        )
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, IchatError::InvalidFormat { .. })
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, IchatError::InvalidDate { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
