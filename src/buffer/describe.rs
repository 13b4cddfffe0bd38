//! Read-only diagnostics of the frame table.

use std::fmt;

use crate::common::{FileId, FrameId, PageId};

/// State of a single frame at the time of [`BufferPool::describe`].
///
/// [`BufferPool::describe`]: crate::buffer::BufferPool::describe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStatus {
    pub frame_id: FrameId,
    pub owner: Option<FileId>,
    /// Name of the owning file, when the frame holds a page.
    pub file_name: Option<String>,
    pub page_no: PageId,
    pub valid: bool,
    pub dirty: bool,
    pub referenced: bool,
    pub pin_count: u32,
}

/// Snapshot of every frame in the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDescription {
    pub frames: Vec<FrameStatus>,
    pub valid_frames: usize,
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.frame_id)?;
        match (&self.file_name, self.owner) {
            (Some(name), Some(owner)) => write!(f, "file:{name} ({owner}) ")?,
            _ => write!(f, "file:NULL ")?,
        }
        write!(
            f,
            "{} pin:{} dirty:{} valid:{} referenced:{}",
            self.page_no, self.pin_count, self.dirty, self.valid, self.referenced
        )
    }
}

impl fmt::Display for PoolDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "{frame}")?;
        }
        write!(f, "Total valid frames: {}", self.valid_frames)
    }
}
