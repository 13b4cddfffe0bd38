//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between page files and the rest
//! of the storage engine. It manages a fixed pool of frames, each holding
//! at most one page.
//!
//! # Components
//! - [`BufferPool`] - The page cache and its public operations
//! - [`FrameDescriptor`] - Per-frame bookkeeping (owner, pins, status bits)
//! - [`PageIndex`] - (file, page) to frame lookup
//! - [`PageHandle`] - Handle to a pinned page
//! - [`BufferPoolStats`] - Performance statistics
//! - [`replacer`] - The CLOCK replacement policy

mod buffer_pool;
mod describe;
mod file_table;
mod frame;
mod page_handle;
mod page_index;
pub mod replacer;
mod stats;

pub use buffer_pool::BufferPool;
pub use describe::{FrameStatus, PoolDescription};
pub use frame::{Frame, FrameDescriptor};
pub use page_handle::PageHandle;
pub use page_index::PageIndex;
pub use stats::{BufferPoolStats, StatsSnapshot};
