//! Error types for clockpool.

use thiserror::Error;

use super::{FileId, FrameId, PageId};

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors raised by the buffer pool and its file layer.
///
/// A lookup miss in the page index is not an error: it is reported as
/// `None` and interpreted locally by each operation.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a file backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every frame is pinned; the replacement sweep found no victim.
    #[error("buffer pool exhausted: all {num_frames} frames are pinned")]
    PoolExhausted { num_frames: usize },

    /// `unpin` on a resident page whose pin count is already zero.
    ///
    /// Indicates a caller bug (double unpin).
    #[error("page {page_no} of file '{file}' in {frame_id} is not pinned")]
    NotPinned {
        file: String,
        page_no: PageId,
        frame_id: FrameId,
    },

    /// `flush_file` met a page of the file that is still pinned.
    #[error("page {page_no} of file '{file}' in {frame_id} is still pinned")]
    StillPinned {
        file: String,
        page_no: PageId,
        frame_id: FrameId,
    },

    /// `flush_file` met a frame that holds no page.
    #[error("corrupt {frame_id}: dirty={dirty} valid={valid} referenced={referenced}")]
    CorruptFrame {
        frame_id: FrameId,
        dirty: bool,
        valid: bool,
        referenced: bool,
    },

    /// The file has no page with this number.
    #[error("page {page_no} not found in file '{file}'")]
    PageNotFound { file: String, page_no: PageId },

    /// Stored checksum does not match the page bytes read back.
    #[error("checksum mismatch on page {page_no} of file '{file}'")]
    ChecksumMismatch { file: String, page_no: PageId },

    /// The page index already holds an entry for this key.
    #[error("page {page_no} of {file_id} is already indexed")]
    DuplicateIndexEntry { file_id: FileId, page_no: PageId },

    /// A frame is owned by a file the pool holds no handle for.
    #[error("{0} owns a resident page but is not registered with the pool")]
    UnknownFile(FileId),

    /// Rejected construction parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
