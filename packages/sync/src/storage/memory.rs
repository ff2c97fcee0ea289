//! In-memory store.

use std::collections::HashMap;

use super::{merge_for_save, StorageError, StorageResult, UpdateStore};
use crate::types::{Project, Update};

/// `HashMap`-backed store, keyed by record id.
///
/// Keeps simple counters so callers can check how the sync core used it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    updates: HashMap<String, Update>,
    projects: HashMap<String, Project>,
    is_open: bool,
    save_calls: usize,
    sessions: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing updates.
    #[must_use]
    pub fn with_updates(mut self, updates: impl IntoIterator<Item = Update>) -> Self {
        for update in updates {
            self.updates.insert(update.id.clone(), update);
        }
        self
    }

    pub fn insert_project(&mut self, project: Project) {
        self.projects.insert(project.id.clone(), project);
    }

    /// Number of stored updates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Stored update by id, regardless of session state.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Update> {
        self.updates.get(id)
    }

    /// Number of `save_update` calls so far.
    #[must_use]
    pub fn save_calls(&self) -> usize {
        self.save_calls
    }

    /// Number of sessions opened so far.
    #[must_use]
    pub fn sessions(&self) -> usize {
        self.sessions
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(StorageError::SessionClosed)
        }
    }
}

impl UpdateStore for MemoryStore {
    fn open(&mut self) -> StorageResult<()> {
        self.is_open = true;
        self.sessions += 1;
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
        self.save_calls += 1;

        let merged = merge_for_save(update, self.updates.get(&update.id), preserve_cached_file);
        self.updates.insert(merged.id.clone(), merged);
        Ok(())
    }

    fn find_project(&self, id: &str) -> StorageResult<Option<Project>> {
        self.ensure_open()?;
        Ok(self.projects.get(id).cloned())
    }

    fn find_update(&self, id: &str) -> StorageResult<Option<Update>> {
        self.ensure_open()?;
        Ok(self.updates.get(id).cloned())
    }
}
