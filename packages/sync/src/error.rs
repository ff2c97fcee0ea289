//! Error types for the sync crate.
//!
//! Uses the dual-error pattern: `SyncError` for library consumers with
//! detailed error context, and narrower error types (`StorageError`,
//! `ReferenceError`) for the collaborators it wraps.

use thiserror::Error;

use crate::storage::StorageError;

/// Main error type for the sync library.
///
/// Every variant is fatal for the parse run that produced it. Recoverable
/// field problems are reported as [`crate::parser::FieldWarning`] instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The XML tokenizer rejected the stream (mismatched tags, bad syntax).
    #[error("XML parsing failed: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Element names or CDATA sections that are not valid UTF-8.
    #[error("Invalid UTF-8 in feed: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The stream ended while elements were still open.
    #[error("Unexpected end of feed with {depth} unclosed element(s)")]
    UnexpectedEof { depth: usize },

    /// An `<object>` opened inside another `<object>`.
    #[error("Nested <object> element at depth {depth}")]
    NestedObject { depth: usize },

    /// A reference element carried no text at all.
    #[error("Empty <{field}> reference in update{}", .id.as_ref().map(|id| format!(" {id}")).unwrap_or_default())]
    EmptyReference {
        field: &'static str,
        id: Option<String>,
    },

    /// The storage adapter failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A record asked for by id does not exist.
    #[error("{kind} {id} not found in store")]
    RecordNotFound { kind: &'static str, id: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Build the structural error for an empty reference path.
    pub(crate) fn empty_reference(field: &'static str, id: &str) -> Self {
        Self::EmptyReference {
            field,
            id: (!id.is_empty()).then(|| id.to_string()),
        }
    }
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
