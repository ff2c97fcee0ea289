//! Storage adapters for synchronized records.
//!
//! The parser only needs the [`UpdateStore`] contract: a scoped session,
//! an idempotent upsert keyed by update id, and two point lookups used by the
//! presentation side of the client.

mod memory;
mod yaml;

pub use memory::MemoryStore;
pub use yaml::YamlStore;

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Project, Update};

/// Errors raised by storage adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A read or write was attempted outside `open()`/`close()`.
    #[error("storage session is not open")]
    SessionClosed,

    /// An update without an id was handed to the store.
    #[error("cannot store an update without an id")]
    MissingId,

    /// Reading or writing a record file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record file holds a different id than the one it was looked up by.
    #[error("record {path} holds id '{found}', expected '{expected}'")]
    IdMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// A record could not be (de)serialized.
    #[error("invalid record {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Contract between the sync core and local storage.
///
/// Sessions are bracketed by [`open`](UpdateStore::open) and
/// [`close`](UpdateStore::close); `close` must be safe to call on a store
/// that failed halfway through a run.
pub trait UpdateStore {
    /// Start a session.
    fn open(&mut self) -> StorageResult<()>;

    /// End the session.
    fn close(&mut self) -> StorageResult<()>;

    /// Insert or replace the update with the same id.
    ///
    /// With `preserve_cached_file`, the cached photo path of an existing
    /// record survives the replacement.
    fn save_update(&mut self, update: &Update, preserve_cached_file: bool) -> StorageResult<()>;

    fn find_project(&self, id: &str) -> StorageResult<Option<Project>>;

    fn find_update(&self, id: &str) -> StorageResult<Option<Update>>;
}

/// Merge an incoming update with the stored version of the same record.
pub(crate) fn merge_for_save(
    incoming: &Update,
    existing: Option<&Update>,
    preserve_cached_file: bool,
) -> Update {
    let mut merged = incoming.clone();
    if preserve_cached_file {
        if let Some(existing) = existing {
            if merged.thumbnail_filename.is_none() {
                merged.thumbnail_filename = existing.thumbnail_filename.clone();
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Update {
        Update {
            id: "7".to_string(),
            title: "Old".to_string(),
            thumbnail_filename: Some("/cache/7.jpg".to_string()),
            ..Update::default()
        }
    }

    #[test]
    fn test_merge_preserves_cached_file() {
        let incoming = Update {
            id: "7".to_string(),
            title: "New".to_string(),
            ..Update::default()
        };
        let merged = merge_for_save(&incoming, Some(&stored()), true);
        assert_eq!(merged.title, "New");
        assert_eq!(merged.thumbnail_filename.as_deref(), Some("/cache/7.jpg"));
    }

    #[test]
    fn test_merge_drops_cached_file_when_not_preserving() {
        let incoming = Update {
            id: "7".to_string(),
            ..Update::default()
        };
        let merged = merge_for_save(&incoming, Some(&stored()), false);
        assert_eq!(merged.thumbnail_filename, None);
    }

    #[test]
    fn test_merge_without_existing_record() {
        let incoming = Update {
            id: "7".to_string(),
            ..Update::default()
        };
        assert_eq!(merge_for_save(&incoming, None, true), incoming);
    }
}
