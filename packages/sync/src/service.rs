//! Sync service that ties the parser and storage together.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::parser::{CompletionMode, ParseReport, UpdateListParser};
use crate::storage::UpdateStore;
use crate::types::Update;

/// Ingest an update list feed, storing every update that carries an id.
///
/// # Arguments
/// * `reader` - Feed XML
/// * `store` - Destination store; a session is opened and closed around the run
/// * `extended_fields` - Whether the feed was requested with photo/video metadata
///
/// # Returns
/// The run's [`ParseReport`], with counts and field warnings
pub fn ingest<R: BufRead, S: UpdateStore>(
    reader: R,
    store: &mut S,
    extended_fields: bool,
) -> Result<ParseReport> {
    UpdateListParser::new(store, CompletionMode::Insert, extended_fields).parse_reader(reader)
}

/// Ingest a feed stored on disk.
pub fn ingest_file<S: UpdateStore>(
    path: &Path,
    store: &mut S,
    extended_fields: bool,
) -> Result<ParseReport> {
    let file = File::open(path)?;
    tracing::debug!(path = %path.display(), "Ingesting feed file");
    ingest(BufReader::new(file), store, extended_fields)
}

/// Ingest a feed held in memory.
pub fn ingest_str<S: UpdateStore>(
    xml: &str,
    store: &mut S,
    extended_fields: bool,
) -> Result<ParseReport> {
    ingest(xml.as_bytes(), store, extended_fields)
}

/// Parse a feed without storing anything and return its last update.
///
/// Used for the single-update response the API sends back after an update
/// has been posted.
pub fn lookup_update<R: BufRead, S: UpdateStore>(reader: R, store: &mut S) -> Result<Option<Update>> {
    let report = UpdateListParser::new(store, CompletionMode::Lookup, true).parse_reader(reader)?;
    if report.had_error() {
        tracing::warn!(
            warnings = report.warning_count(),
            "Update response contained invalid fields"
        );
    }
    Ok(report.into_last_completed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FEED: &str = r#"<response><objects type="list">
<object><id>10</id><title>One</title><time>2013-02-04T10:54:12</time></object>
<object><id>11</id><title>Two</title><time>2013-02-05T08:00:00</time></object>
</objects></response>"#;

    #[test]
    fn test_ingest_str() {
        let mut store = MemoryStore::new();
        let report = ingest_str(FEED, &mut store, false).unwrap();

        assert_eq!(report.success_count(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_ingest_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FEED.as_bytes()).unwrap();

        let mut store = MemoryStore::new();
        let report = ingest_file(file.path(), &mut store, true).unwrap();

        assert_eq!(report.success_count(), 2);
        assert!(report.extended_fields());
    }

    #[test]
    fn test_ingest_missing_file() {
        let mut store = MemoryStore::new();
        let err = ingest_file(Path::new("/nonexistent/feed.xml"), &mut store, false).unwrap_err();

        assert!(matches!(err, crate::error::SyncError::Io(_)));
        assert_eq!(store.sessions(), 0);
    }

    #[test]
    fn test_lookup_update() {
        let mut store = MemoryStore::new();
        let update = lookup_update(FEED.as_bytes(), &mut store).unwrap().unwrap();

        assert_eq!(update.id, "11");
        assert_eq!(update.title, "Two");
        assert_eq!(store.save_calls(), 0);
    }

    #[test]
    fn test_lookup_update_empty_feed() {
        let mut store = MemoryStore::new();
        let update = lookup_update(
            r#"<response><objects type="list"></objects></response>"#.as_bytes(),
            &mut store,
        )
        .unwrap();

        assert_eq!(update, None);
    }
}
