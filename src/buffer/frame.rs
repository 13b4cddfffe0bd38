//! Frames and frame descriptors.
//!
//! A [`Frame`] is the page-sized storage slot; its [`FrameDescriptor`] is the
//! bookkeeping the pool keeps about it:
//! - Which page of which file is loaded (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - Referenced bit for the clock sweep

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{FileId, FrameId, PageId};
use crate::storage::page::Page;

/// Page storage for one slot of the pool.
///
/// The page bytes sit behind their own `RwLock` so handles can read and
/// write pinned pages without holding the pool's bookkeeping lock.
pub struct Frame {
    page: RwLock<Page>,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            page: RwLock::new(Page::empty()),
        }
    }

    /// Acquire read lock on the page.
    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    /// Acquire write lock on the page.
    #[inline]
    pub fn page_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame metadata.
///
/// Invariant: `owner` is `Some` exactly when `valid` is true, and
/// `page_no` is only meaningful while `valid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDescriptor {
    frame_id: FrameId,
    owner: Option<FileId>,
    page_no: PageId,
    valid: bool,
    dirty: bool,
    referenced: bool,
    pin_count: u32,
}

impl FrameDescriptor {
    /// Descriptor of an unoccupied frame.
    pub fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            owner: None,
            page_no: PageId::INVALID,
            valid: false,
            dirty: false,
            referenced: false,
            pin_count: 0,
        }
    }

    /// Bind the frame to a freshly loaded page, pinned once.
    pub fn set(&mut self, owner: FileId, page_no: PageId) {
        self.owner = Some(owner);
        self.page_no = page_no;
        self.valid = true;
        self.dirty = false;
        self.referenced = true;
        self.pin_count = 1;
    }

    /// Return the frame to the unoccupied state.
    pub fn clear(&mut self) {
        *self = Self::new(self.frame_id);
    }

    /// Pin on a cache hit: bump the pin count and mark recently used.
    pub fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.referenced = true;
        self.pin_count
    }

    /// Drop one pin. Returns `None` if the frame was not pinned.
    pub fn unpin(&mut self) -> Option<u32> {
        self.pin_count = self.pin_count.checked_sub(1)?;
        Some(self.pin_count)
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn clear_referenced(&mut self) {
        self.referenced = false;
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    #[inline]
    pub fn owner(&self) -> Option<FileId> {
        self.owner
    }

    #[inline]
    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    /// The page index key of the resident page.
    #[inline]
    pub fn key(&self) -> Option<(FileId, PageId)> {
        match self.owner {
            Some(owner) if self.valid => Some((owner, self.page_no)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_referenced(&self) -> bool {
        self.referenced
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }
}
