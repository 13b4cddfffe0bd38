//! File identity type.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_FILE_ID: AtomicU32 = AtomicU32::new(0);

/// Stable identity of a page file.
///
/// Frame descriptors and the page index store this value instead of a
/// reference to the file object, so cached pages never borrow from the file.
///
/// # Example
/// ```
/// use clockpool::FileId;
///
/// let a = FileId::fresh();
/// let b = FileId::fresh();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a FileId from a raw value.
    #[inline]
    pub fn new(id: u32) -> Self {
        FileId(id)
    }

    /// Allocate an identity no other file in this process has been given.
    pub fn fresh() -> Self {
        FileId(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.0)
    }
}
