//! Common types shared across clockpool.
//!
//! - Configuration
//! - Error types
//! - Identifiers (FileId, PageId, FrameId)

pub mod config;
pub mod error;
mod file_id;
mod frame_id;
mod page_id;

pub use config::{BufferPoolConfig, InvalidFramePolicy};
pub use error::{Error, Result};
pub use file_id::FileId;
pub use frame_id::FrameId;
pub use page_id::PageId;
