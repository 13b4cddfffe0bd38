//! Page index - (file, page) to frame lookup.

use std::collections::HashMap;

use crate::common::{Error, FileId, FrameId, PageId, Result};

/// Maps each resident page to the frame holding it.
///
/// A miss is an ordinary `None`, not an error: every fetch goes through
/// [`PageIndex::lookup`] and most of them are expected to hit or miss.
#[derive(Debug, Default)]
pub struct PageIndex {
    map: HashMap<(FileId, PageId), FrameId>,
}

impl PageIndex {
    /// An empty index with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    /// Register `frame_id` as holding `page_no` of `file_id`.
    ///
    /// # Errors
    /// `Error::DuplicateIndexEntry` if the key is already present; the
    /// existing entry is left untouched.
    pub fn insert(&mut self, file_id: FileId, page_no: PageId, frame_id: FrameId) -> Result<()> {
        use std::collections::hash_map::Entry;

        match self.map.entry((file_id, page_no)) {
            Entry::Occupied(_) => Err(Error::DuplicateIndexEntry { file_id, page_no }),
            Entry::Vacant(slot) => {
                slot.insert(frame_id);
                Ok(())
            }
        }
    }

    #[inline]
    pub fn lookup(&self, file_id: FileId, page_no: PageId) -> Option<FrameId> {
        self.map.get(&(file_id, page_no)).copied()
    }

    pub fn remove(&mut self, file_id: FileId, page_no: PageId) -> Option<FrameId> {
        self.map.remove(&(file_id, page_no))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of resident pages belonging to `file_id`.
    pub fn count_for(&self, file_id: FileId) -> usize {
        self.map.keys().filter(|(f, _)| *f == file_id).count()
    }
}
