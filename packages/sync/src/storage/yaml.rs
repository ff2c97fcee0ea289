//! YAML directory store.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/updates/<id>.yaml
//! <root>/projects/<id>.yaml
//! ```
//!
//! Ids are percent-encoded into file stems, and the id inside a file is checked
//! against the requested one on every read.
//!
//! Writes use the atomic pattern: write a hidden temp file, sync it to disk,
//! then rename over the destination.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{merge_for_save, StorageError, StorageResult, UpdateStore};
use crate::config::record_file_stem;
use crate::types::{Project, Update};

const UPDATES_DIR: &str = "updates";
const PROJECTS_DIR: &str = "projects";

/// Store that keeps one YAML file per record.
#[derive(Debug, Clone)]
pub struct YamlStore {
    root: PathBuf,
    is_open: bool,
}

impl YamlStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            is_open: false,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Insert or replace a project record.
    pub fn save_project(&mut self, project: &Project) -> StorageResult<()> {
        self.ensure_open()?;
        if project.id.is_empty() {
            return Err(StorageError::MissingId);
        }
        let path = self.record_path(PROJECTS_DIR, &project.id);
        read_record::<Project>(&path, &project.id)?;
        write_record(&path, project)
    }

    fn record_path(&self, kind: &str, id: &str) -> PathBuf {
        self.root
            .join(kind)
            .join(format!("{}.yaml", record_file_stem(id)))
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(StorageError::SessionClosed)
        }
    }
}

impl UpdateStore for YamlStore {
    fn open(&mut self) -> StorageResult<()> {
        for kind in [UPDATES_DIR, PROJECTS_DIR] {
            let dir = self.root.join(kind);
            fs::create_dir_all(&dir).map_err(|source| StorageError::Io { path: dir, source })?;
        }
        self.is_open = true;
        tracing::debug!(root = %self.root.display(), "Opened YAML store");
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.is_open = false;
        Ok(())
    }

    fn save_update(&mut self, update: &Update, preserve_cached_file: bool) -> StorageResult<()> {
        self.ensure_open()?;
        if !update.has_id() {
            return Err(StorageError::MissingId);
        }

        let path = self.record_path(UPDATES_DIR, &update.id);
        let existing: Option<Update> = read_record(&path, &update.id)?;
        let merged = merge_for_save(update, existing.as_ref(), preserve_cached_file);
        write_record(&path, &merged)
    }

    fn find_project(&self, id: &str) -> StorageResult<Option<Project>> {
        self.ensure_open()?;
        if id.is_empty() {
            return Ok(None);
        }
        read_record(&self.record_path(PROJECTS_DIR, id), id)
    }

    fn find_update(&self, id: &str) -> StorageResult<Option<Update>> {
        self.ensure_open()?;
        if id.is_empty() {
            return Ok(None);
        }
        read_record(&self.record_path(UPDATES_DIR, id), id)
    }
}

/// Records that carry their own id.
trait StoredRecord {
    fn record_id(&self) -> &str;
}

impl StoredRecord for Update {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl StoredRecord for Project {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Read the record stored for `id`, treating a missing file as "not found".
fn read_record<T>(path: &Path, id: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned + StoredRecord,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let record: T =
        serde_yaml_ng::from_str(&content).map_err(|source| StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;

    if record.record_id() != id {
        return Err(StorageError::IdMismatch {
            path: path.to_path_buf(),
            expected: id.to_string(),
            found: record.record_id().to_string(),
        });
    }

    Ok(Some(record))
}

fn write_record<T: Serialize>(path: &Path, record: &T) -> StorageResult<()> {
    let content = serde_yaml_ng::to_string(record).map_err(|source| StorageError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    {
        let mut file = File::create(&temp_path).map_err(io_err)?;
        file.write_all(content.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path).map_err(io_err)?;
    }

    fs::rename(&temp_path, path).map_err(io_err)
}
