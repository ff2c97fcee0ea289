//! Reference-id extraction from RSR API resource paths.
//!
//! The API links related records through resource URIs such as
//! `/api/v1/project/574/`. Only the trailing segment (the record id) is kept
//! locally.

use thiserror::Error;

use crate::config::REFERENCE_SEPARATOR;

/// Why a resource path could not be resolved to an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The path is empty.
    #[error("reference path is empty")]
    Empty,

    /// The path does not end with a separator.
    #[error("reference path does not end with '/'")]
    MissingTrailingSeparator,

    /// No separator precedes the final segment.
    #[error("reference path has no separator before its last segment")]
    MissingLeadingSeparator,

    /// The final segment is empty (e.g. `//`).
    #[error("reference path has an empty last segment")]
    EmptySegment,
}

/// Extract the trailing id segment from a resource path.
///
/// # Arguments
/// * `path` - Resource path ending in a separator, e.g. `/api/v1/project/574/`
///
/// # Returns
/// The text between the last two separators, borrowed from `path`
///
/// # Examples
/// ```
/// use rsr_sync::reference::{id_from_url, ReferenceError};
///
/// assert_eq!(id_from_url("/api/v1/project/574/"), Ok("574"));
/// assert_eq!(
///     id_from_url("/api/v1/project/574"),
///     Err(ReferenceError::MissingTrailingSeparator)
/// );
/// ```
pub fn id_from_url(path: &str) -> Result<&str, ReferenceError> {
    if path.is_empty() {
        return Err(ReferenceError::Empty);
    }

    let body = path
        .strip_suffix(REFERENCE_SEPARATOR)
        .ok_or(ReferenceError::MissingTrailingSeparator)?;

    let start = body
        .rfind(REFERENCE_SEPARATOR)
        .ok_or(ReferenceError::MissingLeadingSeparator)?;

    let segment = &body[start + REFERENCE_SEPARATOR.len_utf8()..];
    if segment.is_empty() {
        return Err(ReferenceError::EmptySegment);
    }

    Ok(segment)
}
