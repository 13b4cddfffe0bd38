//! Page - the fixed 4KB unit of storage.
//!
//! A [`Page`] is the unit of I/O between a [`PageFile`] and the buffer
//! pool. It knows its own page number, which lives in the header.
//!
//! [`PageFile`]: crate::storage::PageFile

use crate::common::config::PAGE_SIZE;
use crate::common::PageId;

use super::page_header::PageHeader;

/// A page of data (4KB, 4KB-aligned).
///
/// The first [`PageHeader::SIZE`] bytes hold the header; the rest is the
/// caller-visible data area returned by [`Page::data`].
///
/// # Clone Implementation
/// `Page` does not implement `Clone`: copying 4KB should be explicit, so
/// backends use [`Page::copy_from`]. A `#[cfg(test)]` Clone is provided.
///
/// # Example
/// ```
/// use clockpool::{Page, PageId};
///
/// let mut page = Page::new(PageId::new(3));
/// page.data_mut()[0] = 0xFF;
/// assert_eq!(page.data()[0], 0xFF);
/// assert_eq!(page.page_no(), PageId::new(3));
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a zeroed page numbered `page_no`.
    pub fn new(page_no: PageId) -> Self {
        let mut page = Self {
            data: [0u8; PAGE_SIZE],
        };
        PageHeader::new(page_no).write_to(&mut page.data);
        page
    }

    /// Create a page that belongs to no file position yet.
    pub fn empty() -> Self {
        Self::new(PageId::INVALID)
    }

    /// Build a page from raw on-disk bytes, header included.
    pub fn from_bytes(bytes: &[u8; PAGE_SIZE]) -> Self {
        Self { data: *bytes }
    }

    /// Number of this page within its file.
    #[inline]
    pub fn page_no(&self) -> PageId {
        self.header().page_no
    }

    /// Caller-visible bytes (everything after the header).
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[PageHeader::SIZE..]
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[PageHeader::SIZE..]
    }

    /// The whole page, header included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    /// Overwrite this page with the contents of `other`, header included.
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Zero the data area; the page keeps its number.
    pub fn reset(&mut self) {
        self.data[PageHeader::SIZE..].fill(0);
    }

    /// Read the page header.
    pub fn header(&self) -> PageHeader {
        PageHeader::from_bytes(&self.data)
    }

    /// Compute and store the checksum in the header.
    ///
    /// Call this after all modifications to the page are complete.
    pub fn update_checksum(&mut self) {
        let checksum = PageHeader::compute_checksum(&self.data);
        self.data[PageHeader::OFFSET_CHECKSUM..PageHeader::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// Verify the stored checksum.
    pub fn verify_checksum(&self) -> bool {
        self.header().verify_checksum(&self.data)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("page_no", &self.page_no())
            .finish_non_exhaustive()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::empty();
        new_page.copy_from(self);
        new_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_and_alignment() {
        assert_eq!(std::mem::size_of::<Page>(), PAGE_SIZE);
        assert_eq!(std::mem::align_of::<Page>(), 4096);
    }

    #[test]
    fn test_page_number_survives_data_writes() {
        let mut page = Page::new(PageId::new(9));
        page.data_mut().fill(0xEE);

        assert_eq!(page.page_no(), PageId::new(9));
        assert_eq!(page.data().len(), PAGE_SIZE - PageHeader::SIZE);
    }

    #[test]
    fn test_page_reset_keeps_number() {
        let mut page = Page::new(PageId::new(4));
        page.data_mut()[0] = 0xFF;

        page.reset();

        assert_eq!(page.data()[0], 0);
        assert_eq!(page.page_no(), PageId::new(4));
    }

    #[test]
    fn test_copy_from() {
        let mut src = Page::new(PageId::new(1));
        src.data_mut()[10] = 0xAB;

        let mut dst = Page::empty();
        dst.copy_from(&src);

        assert_eq!(dst.page_no(), PageId::new(1));
        assert_eq!(dst.data()[10], 0xAB);
    }

    #[test]
    fn test_checksum_roundtrip() {
        let mut page = Page::new(PageId::new(2));
        page.data_mut()[0] = 0x42;
        page.update_checksum();
        assert!(page.verify_checksum());

        page.data_mut()[0] = 0x43;
        assert!(!page.verify_checksum());
    }
}
