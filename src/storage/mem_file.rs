//! In-memory page file.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::common::{Error, FileId, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageFile;

/// A [`PageFile`] kept entirely in memory.
///
/// Counts every call that would be an I/O on a real file, which makes it the
/// backend of choice for checking the buffer pool's I/O behaviour.
///
/// # Example
/// ```
/// use clockpool::storage::{MemFile, PageFile};
///
/// let file = MemFile::new("scratch");
/// let page = file.allocate_page().unwrap();
/// file.write_page(&page).unwrap();
/// assert_eq!(file.io().writes, 1);
/// ```
pub struct MemFile {
    id: FileId,
    name: String,
    /// Slot `n` holds page `n`; `None` once deleted.
    pages: Mutex<Vec<Option<Box<Page>>>>,
    reads: AtomicU64,
    writes: AtomicU64,
    allocations: AtomicU64,
    deletions: AtomicU64,
}

/// Point-in-time copy of a [`MemFile`]'s I/O counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IoCounts {
    pub reads: u64,
    pub writes: u64,
    pub allocations: u64,
    pub deletions: u64,
}

impl MemFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FileId::fresh(),
            name: name.into(),
            pages: Mutex::new(Vec::new()),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            allocations: AtomicU64::new(0),
            deletions: AtomicU64::new(0),
        }
    }

    /// Create a file with `count` zeroed pages, numbered from 0.
    ///
    /// Pre-population is not counted as I/O.
    pub fn with_pages(name: impl Into<String>, count: u32) -> Self {
        let file = Self::new(name);
        {
            let mut pages = file.pages.lock();
            for n in 0..count {
                pages.push(Some(Box::new(Page::new(PageId::new(n)))));
            }
        }
        file
    }

    /// Snapshot of the I/O counters.
    pub fn io(&self) -> IoCounts {
        IoCounts {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            deletions: self.deletions.load(Ordering::Relaxed),
        }
    }

    /// Number of live (allocated, not deleted) pages.
    pub fn page_count(&self) -> usize {
        self.pages.lock().iter().filter(|p| p.is_some()).count()
    }

    /// Inspect the stored copy of a page without counting a read.
    pub fn peek<R>(&self, page_no: PageId, f: impl FnOnce(&Page) -> R) -> Option<R> {
        let pages = self.pages.lock();
        pages
            .get(page_no.0 as usize)
            .and_then(|slot| slot.as_deref())
            .map(f)
    }

    fn not_found(&self, page_no: PageId) -> Error {
        Error::PageNotFound {
            file: self.name.clone(),
            page_no,
        }
    }
}

impl PageFile for MemFile {
    fn id(&self) -> FileId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_page(&self, page_no: PageId) -> Result<Page> {
        let pages = self.pages.lock();
        let stored = pages
            .get(page_no.0 as usize)
            .and_then(|slot| slot.as_deref())
            .ok_or_else(|| self.not_found(page_no))?;

        let mut page = Page::empty();
        page.copy_from(stored);
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(page)
    }

    fn write_page(&self, page: &Page) -> Result<()> {
        let page_no = page.page_no();
        let mut pages = self.pages.lock();
        let stored = pages
            .get_mut(page_no.0 as usize)
            .and_then(|slot| slot.as_deref_mut())
            .ok_or_else(|| self.not_found(page_no))?;

        stored.copy_from(page);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn allocate_page(&self) -> Result<Page> {
        let mut pages = self.pages.lock();
        let page_no = PageId::new(pages.len() as u32);
        pages.push(Some(Box::new(Page::new(page_no))));

        self.allocations.fetch_add(1, Ordering::Relaxed);
        Ok(Page::new(page_no))
    }

    fn delete_page(&self, page_no: PageId) -> Result<()> {
        let mut pages = self.pages.lock();
        let slot = pages
            .get_mut(page_no.0 as usize)
            .filter(|slot| slot.is_some())
            .ok_or_else(|| self.not_found(page_no))?;

        *slot = None;
        self.deletions.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_numbers_sequentially() {
        let file = MemFile::new("t");
        assert_eq!(file.allocate_page().unwrap().page_no(), PageId::new(0));
        assert_eq!(file.allocate_page().unwrap().page_no(), PageId::new(1));
        assert_eq!(file.page_count(), 2);
        assert_eq!(file.io().allocations, 2);
    }

    #[test]
    fn test_write_then_read() {
        let file = MemFile::with_pages("t", 2);

        let mut page = file.read_page(PageId::new(1)).unwrap();
        page.data_mut()[0] = 0x42;
        file.write_page(&page).unwrap();

        let page = file.read_page(PageId::new(1)).unwrap();
        assert_eq!(page.data()[0], 0x42);
        assert_eq!(
            file.io(),
            IoCounts {
                reads: 2,
                writes: 1,
                allocations: 0,
                deletions: 0
            }
        );
    }

    #[test]
    fn test_deleted_page_is_gone() {
        let file = MemFile::with_pages("t", 1);
        file.delete_page(PageId::new(0)).unwrap();

        assert!(matches!(
            file.read_page(PageId::new(0)),
            Err(Error::PageNotFound { .. })
        ));
        assert!(file.delete_page(PageId::new(0)).is_err());
        assert_eq!(file.page_count(), 0);
    }

    #[test]
    fn test_peek_does_not_count() {
        let file = MemFile::with_pages("t", 1);
        let first = file.peek(PageId::new(0), |p| p.data()[0]);
        assert_eq!(first, Some(0));
        assert_eq!(file.io().reads, 0);
    }
}
