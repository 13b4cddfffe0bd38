//! Handles to pinned pages.
//!
//! A [`PageHandle`] is what `fetch` and `allocate_page` hand back: the
//! address of a pinned frame plus access to its bytes. It does not unpin on
//! drop; pins are released explicitly, either with [`PageHandle::unpin`] or
//! `BufferPool::unpin`.

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{FileId, FrameId, PageId, Result};
use crate::storage::page::Page;

use super::buffer_pool::BufferPool;

/// A pinned page in the buffer pool.
///
/// The handle borrows the pool, so it cannot outlive it. Page bytes are
/// reached through [`read`](PageHandle::read) and
/// [`write`](PageHandle::write), which lock the frame for the lifetime of
/// the returned guard. Guards borrow the handle, so a guard cannot outlive
/// the pin released by [`unpin`](PageHandle::unpin):
///
/// ```compile_fail
/// use std::sync::Arc;
/// use clockpool::{BufferPool, storage::MemFile};
///
/// let pool = BufferPool::new(1);
/// let file = Arc::new(MemFile::new("example"));
///
/// let (_, handle) = pool.allocate_page(&file).unwrap();
/// let guard = handle.read();
/// handle.unpin(false).unwrap(); // error: `handle` is still borrowed
/// drop(guard);
/// ```
///
/// Unpinning through `BufferPool::unpin` instead bypasses that check; drop
/// the guards first, since an unpinned frame may be evicted and eviction
/// needs its lock.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use clockpool::{BufferPool, storage::MemFile};
///
/// let pool = BufferPool::new(4);
/// let file = Arc::new(MemFile::new("example"));
///
/// let (page_no, handle) = pool.allocate_page(&file).unwrap();
/// handle.write().data_mut()[0] = 0xAB;
/// handle.unpin(true).unwrap();
///
/// let handle = pool.fetch(&file, page_no).unwrap();
/// assert_eq!(handle.read().data()[0], 0xAB);
/// handle.unpin(false).unwrap();
/// ```
pub struct PageHandle<'a> {
    pool: &'a BufferPool,
    frame_id: FrameId,
    file_id: FileId,
    page_no: PageId,
}

impl<'a> PageHandle<'a> {
    pub(crate) fn new(
        pool: &'a BufferPool,
        frame_id: FrameId,
        file_id: FileId,
        page_no: PageId,
    ) -> Self {
        Self {
            pool,
            frame_id,
            file_id,
            page_no,
        }
    }

    #[inline]
    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    #[inline]
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Shared access to the page bytes.
    pub fn read(&self) -> RwLockReadGuard<'_, Page> {
        self.pool.frame(self.frame_id).page()
    }

    /// Exclusive access to the page bytes.
    ///
    /// Writing does not mark the page dirty; pass `true` when unpinning.
    pub fn write(&self) -> RwLockWriteGuard<'_, Page> {
        self.pool.frame(self.frame_id).page_mut()
    }

    /// Release this pin, marking the page dirty if `dirty` is set.
    pub fn unpin(self, dirty: bool) -> Result<()> {
        self.pool.unpin_page(self.file_id, self.page_no, dirty)
    }
}

impl std::fmt::Debug for PageHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHandle")
            .field("frame_id", &self.frame_id)
            .field("file_id", &self.file_id)
            .field("page_no", &self.page_no)
            .finish()
    }
}
