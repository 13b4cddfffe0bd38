//! Page header.
//!
//! Every page starts with a [`PageHeader`] carrying the page's own number
//! and a CRC32 checksum slot used by file backends that verify reads.

use crate::common::PageId;

/// Metadata stored at the beginning of every page.
///
/// # Layout (8 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     page_no (little-endian)
/// 4       4     checksum (CRC32, little-endian)
/// ```
///
/// # Checksum
/// The checksum is computed over the entire page with the checksum field
/// itself treated as zero, so it can be verified in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Number of this page within its file.
    pub page_no: PageId,
    /// CRC32 checksum of the page contents.
    pub checksum: u32,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = crate::common::config::PAGE_HEADER_SIZE;

    pub const OFFSET_PAGE_NO: usize = 0;
    pub const OFFSET_CHECKSUM: usize = 4;

    /// Header for page `page_no` with an empty checksum.
    pub fn new(page_no: PageId) -> Self {
        Self {
            page_no,
            checksum: 0,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        let page_no = u32::from_le_bytes([
            data[Self::OFFSET_PAGE_NO],
            data[Self::OFFSET_PAGE_NO + 1],
            data[Self::OFFSET_PAGE_NO + 2],
            data[Self::OFFSET_PAGE_NO + 3],
        ]);

        let checksum = u32::from_le_bytes([
            data[Self::OFFSET_CHECKSUM],
            data[Self::OFFSET_CHECKSUM + 1],
            data[Self::OFFSET_CHECKSUM + 2],
            data[Self::OFFSET_CHECKSUM + 3],
        ]);

        Self {
            page_no: PageId::new(page_no),
            checksum,
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_PAGE_NO..Self::OFFSET_PAGE_NO + 4]
            .copy_from_slice(&self.page_no.0.to_le_bytes());
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// Compute the CRC32 checksum of a full page.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();

        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        // checksum field counts as zeros
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 4..]);

        hasher.finalize()
    }

    /// Check the stored checksum against the page bytes.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::PAGE_SIZE;

    #[test]
    fn test_page_header_byte_layout() {
        let header = PageHeader {
            page_no: PageId::new(0x04030201),
            checksum: 0x08070605,
        };

        let mut buffer = [0u8; PageHeader::SIZE];
        header.write_to(&mut buffer);

        assert_eq!(buffer, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(PageHeader::from_bytes(&buffer), header);
    }

    #[test]
    fn test_checksum_changes_with_data() {
        let mut page1 = [0u8; PAGE_SIZE];
        let mut page2 = [0u8; PAGE_SIZE];

        page1[500] = 0xFF;
        page2[500] = 0xFE;

        assert_ne!(
            PageHeader::compute_checksum(&page1),
            PageHeader::compute_checksum(&page2)
        );
    }

    #[test]
    fn test_checksum_ignores_checksum_field() {
        let mut page_data = [0u8; PAGE_SIZE];
        page_data[100] = 0xAB;

        let checksum1 = PageHeader::compute_checksum(&page_data);
        page_data[4..8].copy_from_slice(&[0xFF; 4]);
        let checksum2 = PageHeader::compute_checksum(&page_data);

        assert_eq!(checksum1, checksum2);
    }

    #[test]
    fn test_checksum_verify() {
        let mut page_data = [0u8; PAGE_SIZE];
        page_data[100] = 0xAB;

        let header = PageHeader {
            page_no: PageId::new(0),
            checksum: PageHeader::compute_checksum(&page_data),
        };
        assert!(header.verify_checksum(&page_data));

        page_data[100] = 0xFF;
        assert!(!header.verify_checksum(&page_data));
    }
}
