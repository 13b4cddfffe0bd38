//! Storage layer - the page file abstraction and page format.
//!
//! - [`PageFile`] - The file interface the buffer pool consumes
//! - [`MemFile`] - In-memory file with I/O counters
//! - [`DiskFile`] - Single-file, checksummed on-disk backend
//! - [`page`] - Page type and header

mod disk_file;
mod file;
mod mem_file;
pub mod page;

pub use disk_file::DiskFile;
pub use file::PageFile;
pub use mem_file::{IoCounts, MemFile};
