//! Handles of the files that own resident pages.

use std::collections::HashMap;
use std::sync::Arc;

use crate::common::FileId;
use crate::storage::PageFile;

struct FileEntry {
    file: Arc<dyn PageFile>,
    /// Number of valid frames owned by this file.
    resident: usize,
}

/// Resolves a descriptor's [`FileId`] to the file it must be written back to.
///
/// Entries are reference counted by resident page: a file is held only
/// while at least one of its pages occupies a frame.
#[derive(Default)]
pub(crate) struct FileTable {
    files: HashMap<FileId, FileEntry>,
}

impl FileTable {
    /// Record one more resident page of `file_id`.
    ///
    /// `handle` is only called when the file is not registered yet.
    pub fn acquire(&mut self, file_id: FileId, handle: impl FnOnce() -> Arc<dyn PageFile>) {
        self.files
            .entry(file_id)
            .or_insert_with(|| FileEntry {
                file: handle(),
                resident: 0,
            })
            .resident += 1;
    }

    /// Record that a page of `file_id` left the pool.
    pub fn release(&mut self, file_id: FileId) {
        if let Some(entry) = self.files.get_mut(&file_id) {
            entry.resident = entry.resident.saturating_sub(1);
            if entry.resident == 0 {
                self.files.remove(&file_id);
            }
        }
    }

    pub fn get(&self, file_id: FileId) -> Option<&Arc<dyn PageFile>> {
        self.files.get(&file_id).map(|entry| &entry.file)
    }

    /// Display name of a registered file, or its id when unknown.
    pub fn name_of(&self, file_id: FileId) -> String {
        match self.get(file_id) {
            Some(file) => file.name().to_string(),
            None => file_id.to_string(),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.files.len()
    }
}
