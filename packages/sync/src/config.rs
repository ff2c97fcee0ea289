//! Configuration constants and small conversion helpers for the sync crate.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{Result, SyncError};

/// Element that delimits one update record in the feed.
pub const OBJECT_TAG: &str = "object";

/// Timestamp format used by the RSR API (`yyyy-MM-dd'T'HH:mm:ss`, UTC).
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Separator of resource path segments.
pub const REFERENCE_SEPARATOR: char = '/';

/// Maximum number of field warnings kept in a parse report.
///
/// Warnings beyond this limit are counted but not stored, so memory use stays
/// independent of feed size.
pub const MAX_RECORDED_WARNINGS: usize = 100;

/// Environment variable overriding the store directory.
pub const STORE_DIR_ENV: &str = "RSR_STORE_DIR";

/// Default store directory when neither CLI flag nor environment is set.
pub const DEFAULT_STORE_DIR: &str = "rsr-data";

/// Text wrap width for CLI output.
pub const TEXT_WRAP_WIDTH: usize = 100;

/// Parse an API timestamp as a UTC instant.
///
/// Trailing text after the seconds field (fractions, zone designators) is
/// ignored, matching how the API's own clients read these values.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use rsr_sync::config::parse_feed_date;
///
/// assert_eq!(
///     parse_feed_date("2013-02-04T10:54:12").unwrap(),
///     Utc.with_ymd_and_hms(2013, 2, 4, 10, 54, 12).unwrap()
/// );
/// assert!(parse_feed_date("not-a-date").is_err());
/// ```
pub fn parse_feed_date(text: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    let (naive, remainder) = NaiveDateTime::parse_and_remainder(text, DATE_FORMAT)?;
    if !remainder.is_empty() {
        tracing::debug!(value = text, remainder, "Ignoring trailing timestamp text");
    }
    Ok(naive.and_utc())
}

/// Encode a record id into a file stem.
///
/// Every byte outside `[A-Za-z0-9_.~-]` is percent-encoded, so distinct ids
/// map to distinct stems and no id can leave its record directory.
///
/// # Examples
/// ```
/// use rsr_sync::config::record_file_stem;
///
/// assert_eq!(record_file_stem("2505"), "2505");
/// assert_eq!(record_file_stem("../etc/passwd"), "..%2Fetc%2Fpasswd");
/// ```
pub fn record_file_stem(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Runtime configuration for the CLI and other embedders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub store_dir: PathBuf,
    pub extended_fields: bool,
}

impl SyncConfig {
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            extended_fields: false,
        }
    }

    /// Build from the environment, falling back to [`DEFAULT_STORE_DIR`].
    pub fn from_env() -> Result<Self> {
        let store_dir = match std::env::var(STORE_DIR_ENV) {
            Ok(dir) if dir.trim().is_empty() => {
                return Err(SyncError::Config(format!("{STORE_DIR_ENV} is set but empty")));
            }
            Ok(dir) => PathBuf::from(dir),
            Err(_) => PathBuf::from(DEFAULT_STORE_DIR),
        };

        Ok(Self::new(store_dir))
    }

    pub fn with_store_dir(mut self, store_dir: Option<&Path>) -> Self {
        if let Some(dir) = store_dir {
            self.store_dir = dir.to_path_buf();
        }
        self
    }

    pub fn with_extended_fields(mut self, extended_fields: bool) -> Self {
        self.extended_fields = extended_fields;
        self
    }
}
