//! Disk-backed page file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, FileId, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageFile;

/// A [`PageFile`] stored in a single operating-system file.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Every page is stamped with a CRC32 checksum on write and verified on
/// read. Deleted page numbers go on an in-memory free list and are handed
/// out again by `allocate_page`. The free list is not persisted and a
/// delete leaves the slot's bytes in place, so after reopening, pages
/// deleted in an earlier session are live again with their old contents.
///
/// # Durability
/// All writes are followed by `fsync()`.
pub struct DiskFile {
    id: FileId,
    name: String,
    inner: Mutex<DiskFileInner>,
}

struct DiskFileInner {
    file: File,
    /// Number of page slots in the file, including freed ones.
    page_count: u32,
    free: Vec<PageId>,
}

impl DiskFile {
    /// Create a new page file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;

        Ok(Self::from_parts(path.as_ref(), file, 0))
    }

    /// Open an existing page file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())?;

        let file_size = file.metadata()?.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self::from_parts(path.as_ref(), file, page_count))
    }

    /// Open an existing page file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    fn from_parts(path: &Path, file: File, page_count: u32) -> Self {
        Self {
            id: FileId::fresh(),
            name: path.display().to_string(),
            inner: Mutex::new(DiskFileInner {
                file,
                page_count,
                free: Vec::new(),
            }),
        }
    }

    /// Number of live pages (allocated and not deleted).
    pub fn page_count(&self) -> u32 {
        let inner = self.inner.lock();
        inner.page_count - inner.free.len() as u32
    }

    fn not_found(&self, page_no: PageId) -> Error {
        Error::PageNotFound {
            file: self.name.clone(),
            page_no,
        }
    }
}

impl DiskFileInner {
    fn is_live(&self, page_no: PageId) -> bool {
        page_no.is_valid() && page_no.0 < self.page_count && !self.free.contains(&page_no)
    }

    fn write_at(&mut self, page: &Page) -> Result<()> {
        let mut stamped = Page::empty();
        stamped.copy_from(page);
        stamped.update_checksum();

        let offset = (page.page_no().0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(stamped.as_bytes())?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl PageFile for DiskFile {
    fn id(&self) -> FileId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_page(&self, page_no: PageId) -> Result<Page> {
        let mut inner = self.inner.lock();
        if !inner.is_live(page_no) {
            return Err(self.not_found(page_no));
        }

        let offset = (page_no.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;

        let mut bytes = [0u8; PAGE_SIZE];
        inner.file.read_exact(&mut bytes)?;

        let page = Page::from_bytes(&bytes);
        if page.page_no() != page_no || !page.verify_checksum() {
            return Err(Error::ChecksumMismatch {
                file: self.name.clone(),
                page_no,
            });
        }
        Ok(page)
    }

    fn write_page(&self, page: &Page) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.is_live(page.page_no()) {
            return Err(self.not_found(page.page_no()));
        }
        inner.write_at(page)
    }

    fn allocate_page(&self) -> Result<Page> {
        let mut inner = self.inner.lock();

        let page_no = match inner.free.pop() {
            Some(page_no) => page_no,
            None => PageId::new(inner.page_count),
        };

        let page = Page::new(page_no);
        inner.write_at(&page)?;
        if page_no.0 == inner.page_count {
            inner.page_count += 1;
        }
        Ok(page)
    }

    fn delete_page(&self, page_no: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.is_live(page_no) {
            return Err(self.not_found(page_no));
        }
        inner.free.push(page_no);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        DiskFile::create(&path).unwrap();
        assert!(DiskFile::create(&path).is_err());
    }

    #[test]
    fn test_allocate_write_read() {
        let dir = tempdir().unwrap();
        let file = DiskFile::create(dir.path().join("test.db")).unwrap();

        let mut page = file.allocate_page().unwrap();
        assert_eq!(page.page_no(), PageId::new(0));

        page.data_mut()[0] = 0xAB;
        page.data_mut()[100] = 0xCD;
        file.write_page(&page).unwrap();

        let read = file.read_page(PageId::new(0)).unwrap();
        assert_eq!(read.data()[0], 0xAB);
        assert_eq!(read.data()[100], 0xCD);
        assert_eq!(read.page_no(), PageId::new(0));
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let file = DiskFile::create(&path).unwrap();
            let mut page = file.allocate_page().unwrap();
            page.data_mut()[0] = 0x42;
            file.write_page(&page).unwrap();
        }

        {
            let file = DiskFile::open(&path).unwrap();
            assert_eq!(file.page_count(), 1);
            let page = file.read_page(PageId::new(0)).unwrap();
            assert_eq!(page.data()[0], 0x42);
        }
    }

    #[test]
    fn test_read_unallocated_page() {
        let dir = tempdir().unwrap();
        let file = DiskFile::create(dir.path().join("test.db")).unwrap();
        file.allocate_page().unwrap();

        assert!(matches!(
            file.read_page(PageId::new(1)),
            Err(Error::PageNotFound { .. })
        ));
        assert!(file.write_page(&Page::new(PageId::new(1))).is_err());
    }

    #[test]
    fn test_deleted_page_is_reused() {
        let dir = tempdir().unwrap();
        let file = DiskFile::create(dir.path().join("test.db")).unwrap();
        file.allocate_page().unwrap();
        file.allocate_page().unwrap();

        file.delete_page(PageId::new(0)).unwrap();
        assert_eq!(file.page_count(), 1);
        assert!(file.read_page(PageId::new(0)).is_err());
        assert!(file.delete_page(PageId::new(0)).is_err());

        let page = file.allocate_page().unwrap();
        assert_eq!(page.page_no(), PageId::new(0));
        assert_eq!(file.page_count(), 2);
    }

    #[test]
    fn test_deleted_page_revives_after_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let file = DiskFile::create(&path).unwrap();
            let mut page = file.allocate_page().unwrap();
            page.data_mut()[0] = 0x42;
            file.write_page(&page).unwrap();
            file.delete_page(PageId::new(0)).unwrap();
            assert_eq!(file.page_count(), 0);
        }

        {
            let file = DiskFile::open(&path).unwrap();
            assert_eq!(file.page_count(), 1);
            let page = file.read_page(PageId::new(0)).unwrap();
            assert_eq!(page.data()[0], 0x42);
        }
    }

    #[test]
    fn test_corruption_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let file = DiskFile::create(&path).unwrap();
            let mut page = file.allocate_page().unwrap();
            page.data_mut()[0] = 0x11;
            file.write_page(&page).unwrap();
        }

        {
            let mut raw = OpenOptions::new().write(true).open(&path).unwrap();
            raw.seek(SeekFrom::Start(100)).unwrap();
            raw.write_all(&[0xFF]).unwrap();
        }

        let file = DiskFile::open(&path).unwrap();
        assert!(matches!(
            file.read_page(PageId::new(0)),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let file = DiskFile::open_or_create(&path).unwrap();
            assert_eq!(file.page_count(), 0);
            file.allocate_page().unwrap();
        }

        {
            let file = DiskFile::open_or_create(&path).unwrap();
            assert_eq!(file.page_count(), 1);
        }
    }
}
