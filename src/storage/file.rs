//! The file abstraction consumed by the buffer pool.

use crate::common::{FileId, PageId, Result};
use crate::storage::page::Page;

/// A file of fixed-size pages.
///
/// The buffer pool never interprets page bytes; it only moves whole pages
/// through this trait. Methods take `&self` so a single file can be shared
/// between the pool and its callers behind an `Arc`; implementations
/// provide their own interior locking.
pub trait PageFile: Send + Sync {
    /// Stable identity of this file, used as the page index key.
    fn id(&self) -> FileId;

    /// Human-readable name for diagnostics and error messages.
    fn name(&self) -> &str;

    /// Read page `page_no` from the file.
    ///
    /// # Errors
    /// `Error::PageNotFound` if the page was never allocated or was deleted.
    fn read_page(&self, page_no: PageId) -> Result<Page>;

    /// Write `page` back at the position given by its own page number.
    fn write_page(&self, page: &Page) -> Result<()>;

    /// Allocate a new zeroed page; the returned page carries its number.
    fn allocate_page(&self) -> Result<Page>;

    /// Delete page `page_no` from the file.
    fn delete_page(&self, page_no: PageId) -> Result<()>;
}

impl<T: PageFile + ?Sized> PageFile for std::sync::Arc<T> {
    fn id(&self) -> FileId {
        (**self).id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_page(&self, page_no: PageId) -> Result<Page> {
        (**self).read_page(page_no)
    }

    fn write_page(&self, page: &Page) -> Result<()> {
        (**self).write_page(page)
    }

    fn allocate_page(&self) -> Result<Page> {
        (**self).allocate_page()
    }

    fn delete_page(&self, page_no: PageId) -> Result<()> {
        (**self).delete_page(page_no)
    }
}
