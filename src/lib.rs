//! clockpool - a CLOCK-replacement buffer pool manager.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            clockpool                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Buffer Pool (buffer/)                   │   │
//! │  │   fetch · allocate_page · unpin · flush_file · dispose  │   │
//! │  │  ┌───────────┐ ┌──────────────┐ ┌────────────────────┐  │   │
//! │  │  │ PageIndex │ │ Descriptors  │ │ ClockReplacer hand │  │   │
//! │  │  └───────────┘ └──────────────┘ └────────────────────┘  │   │
//! │  │           Frames (fixed arena) + Statistics             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Storage Layer (storage/)                │   │
//! │  │         PageFile trait · MemFile · DiskFile · Page      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (FileId, PageId, FrameId, Error, config)
//! - [`buffer`] - The buffer pool and its replacement policy
//! - [`storage`] - The page file abstraction and page format
//!
//! # Quick Start
//! ```
//! use std::sync::Arc;
//! use clockpool::{BufferPool, storage::MemFile};
//!
//! let pool = BufferPool::new(16);
//! let file = Arc::new(MemFile::new("accounts"));
//!
//! let (page_no, page) = pool.allocate_page(&file).unwrap();
//! page.write().data_mut()[..5].copy_from_slice(b"hello");
//! pool.unpin(&file, page_no, true).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{BufferPoolConfig, Error, FileId, FrameId, InvalidFramePolicy, PageId, Result};

pub use buffer::{BufferPool, BufferPoolStats, PageHandle, PoolDescription, StatsSnapshot};
pub use storage::page::{Page, PageHeader};
pub use storage::{DiskFile, MemFile, PageFile};
