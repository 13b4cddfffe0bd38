//! Buffer Pool - the core page caching layer.
//!
//! The [`BufferPool`] provides:
//! - Page caching between page files and memory
//! - Pin-based reference counting
//! - CLOCK (second chance) replacement
//! - Dirty page write-back on eviction and on `flush_file`

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::buffer::describe::{FrameStatus, PoolDescription};
use crate::buffer::file_table::FileTable;
use crate::buffer::frame::{Frame, FrameDescriptor};
use crate::buffer::page_index::PageIndex;
use crate::buffer::replacer::{ClockReplacer, Victim};
use crate::buffer::{BufferPoolStats, PageHandle};
use crate::common::{
    BufferPoolConfig, Error, FileId, FrameId, InvalidFramePolicy, PageId, Result,
};
use crate::storage::PageFile;

/// Manages a fixed pool of frames caching pages of any number of files.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                         BufferPool                           │
/// │  ┌───────────── state: Mutex<PoolState> ─────────────────┐  │
/// │  │ page_index        descriptors         clock   files   │  │
/// │  │ (file,page)→Fid   [Desc0][Desc1]...   hand    Fid→Arc │  │
/// │  └────────────────────────────────────────────────────────┘  │
/// │  ┌──────────────────────────────────────────────────────┐    │
/// │  │   frames: Vec<Frame>  [Frame0] [Frame1] [Frame2] ... │    │
/// │  └──────────────────────────────────────────────────────┘    │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `state`: one `Mutex`, held for the whole of each operation, including
///   the write-back of an eviction victim, so a victim cannot be re-pinned
///   halfway through its eviction
/// - `frames`: no outer lock; each frame's bytes sit behind their own
///   `RwLock` and are only touched while the frame is pinned
/// - `stats`: atomic counters
///
/// # Usage
/// ```
/// use std::sync::Arc;
/// use clockpool::{BufferPool, PageId, storage::MemFile};
///
/// let pool = BufferPool::new(8);
/// let file = Arc::new(MemFile::with_pages("orders", 4));
///
/// let page = pool.fetch(&file, PageId::new(2)).unwrap();
/// page.write().data_mut()[0] = 0x2A;
/// pool.unpin(&file, PageId::new(2), true).unwrap();
/// ```
pub struct BufferPool {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame>,

    /// Bookkeeping for every frame, behind a single lock.
    state: Mutex<PoolState>,

    stats: BufferPoolStats,

    config: BufferPoolConfig,
}

struct PoolState {
    descriptors: Vec<FrameDescriptor>,
    index: PageIndex,
    replacer: ClockReplacer,
    files: FileTable,
}

impl BufferPool {
    /// Create a pool of `num_frames` frames with the default policies.
    ///
    /// # Panics
    /// Panics if `num_frames` is 0.
    pub fn new(num_frames: usize) -> Self {
        assert!(num_frames > 0, "num_frames must be > 0");
        Self::build(BufferPoolConfig::new(num_frames))
    }

    /// Create a pool from a validated config.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if the config is rejected by
    /// [`BufferPoolConfig::validate`].
    pub fn with_config(config: BufferPoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: BufferPoolConfig) -> Self {
        let num_frames = config.num_frames;

        let frames = (0..num_frames).map(|_| Frame::new()).collect();
        let descriptors = (0..num_frames)
            .map(|i| FrameDescriptor::new(FrameId::new(i)))
            .collect();

        debug!(num_frames, "buffer pool created");

        Self {
            frames,
            state: Mutex::new(PoolState {
                descriptors,
                index: PageIndex::with_capacity(config.index_capacity()),
                replacer: ClockReplacer::new(num_frames),
                files: FileTable::default(),
            }),
            stats: BufferPoolStats::new(),
            config,
        }
    }

    // ========================================================================
    // Public API: page access
    // ========================================================================

    /// Pin page `page_no` of `file`, reading it in if it is not resident.
    ///
    /// A hit costs no I/O; a miss costs exactly one `read_page` plus, if the
    /// victim frame was dirty, one `write_page` to the victim's file.
    ///
    /// `file` may be any `Arc`, including `Arc<dyn PageFile>`.
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - any error from the victim's write-back or from `read_page`
    pub fn fetch<F>(&self, file: &Arc<F>, page_no: PageId) -> Result<PageHandle<'_>>
    where
        F: PageFile + ?Sized + 'static,
    {
        let file_id = file.id();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(frame_id) = state.index.lookup(file_id, page_no) {
            state.descriptors[frame_id.0].pin();
            self.stats.record_hit();
            trace!(%file_id, %page_no, %frame_id, "buffer pool hit");
            return Ok(PageHandle::new(self, frame_id, file_id, page_no));
        }

        let frame_id = self.allocate_frame(state)?;
        let page = file.read_page(page_no)?;
        self.stats.record_miss();

        *self.frames[frame_id.0].page_mut() = page;
        self.install(state, file, page_no, frame_id)?;

        debug!(file = file.name(), %page_no, %frame_id, "buffer pool miss, page read");
        Ok(PageHandle::new(self, frame_id, file_id, page_no))
    }

    /// Allocate a new page in `file` and pin it in a frame.
    ///
    /// The page is allocated in the file first; if no frame can be found
    /// afterwards the page stays allocated in the file.
    pub fn allocate_page<F>(&self, file: &Arc<F>) -> Result<(PageId, PageHandle<'_>)>
    where
        F: PageFile + ?Sized + 'static,
    {
        let file_id = file.id();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let page = file.allocate_page()?;
        let page_no = page.page_no();

        let frame_id = self.allocate_frame(state)?;
        *self.frames[frame_id.0].page_mut() = page;
        self.install(state, file, page_no, frame_id)?;

        debug!(file = file.name(), %page_no, %frame_id, "allocated new page");
        Ok((page_no, PageHandle::new(self, frame_id, file_id, page_no)))
    }

    /// Release one pin on page `page_no` of `file`.
    ///
    /// Unpinning a page that is not resident is a no-op. `dirty` only ever
    /// sets the dirty flag; it is cleared by write-back alone.
    ///
    /// # Errors
    /// `Error::NotPinned` if the page is resident with a pin count of zero.
    pub fn unpin<F>(&self, file: &F, page_no: PageId, dirty: bool) -> Result<()>
    where
        F: PageFile + ?Sized,
    {
        self.unpin_page(file.id(), page_no, dirty)
    }

    pub(crate) fn unpin_page(&self, file_id: FileId, page_no: PageId, dirty: bool) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(frame_id) = state.index.lookup(file_id, page_no) else {
            return Ok(());
        };

        let desc = &mut state.descriptors[frame_id.0];
        if desc.unpin().is_none() {
            return Err(Error::NotPinned {
                file: state.files.name_of(file_id),
                page_no,
                frame_id,
            });
        }
        if dirty {
            desc.mark_dirty();
        }
        Ok(())
    }

    /// Write back and drop every resident page of `file`.
    ///
    /// Scans the whole pool in frame order. Under the default
    /// [`InvalidFramePolicy::Reject`] an invalid frame anywhere in the pool
    /// fails the call, whichever file would have owned it; with
    /// [`InvalidFramePolicy::Skip`] invalid frames are ignored.
    ///
    /// Frames handled before a failure stay flushed; nothing is rolled back.
    ///
    /// # Errors
    /// - `Error::CorruptFrame` on an invalid frame (under `Reject`)
    /// - `Error::StillPinned` on a pinned page of `file`
    /// - any error from `write_page`
    pub fn flush_file<F>(&self, file: &F) -> Result<()>
    where
        F: PageFile + ?Sized,
    {
        let file_id = file.id();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let resident = state.index.count_for(file_id);
        let mut written = 0usize;

        for (i, frame) in self.frames.iter().enumerate() {
            let desc = &state.descriptors[i];

            if !desc.is_valid() {
                match self.config.invalid_frame_policy {
                    InvalidFramePolicy::Reject => {
                        return Err(Error::CorruptFrame {
                            frame_id: desc.frame_id(),
                            dirty: desc.is_dirty(),
                            valid: desc.is_valid(),
                            referenced: desc.is_referenced(),
                        });
                    }
                    InvalidFramePolicy::Skip => continue,
                }
            }

            if desc.owner() != Some(file_id) {
                continue;
            }

            let page_no = desc.page_no();
            if desc.is_pinned() {
                return Err(Error::StillPinned {
                    file: file.name().to_string(),
                    page_no,
                    frame_id: desc.frame_id(),
                });
            }

            if desc.is_dirty() {
                file.write_page(&frame.page())?;
                state.descriptors[i].clear_dirty();
                self.stats.record_write();
                written += 1;
            }

            state.index.remove(file_id, page_no);
            state.descriptors[i].clear();
            state.files.release(file_id);
        }

        debug!(file = file.name(), flushed = resident, written, "flushed file");
        Ok(())
    }

    /// Drop page `page_no` from the pool, if resident, and delete it from
    /// `file`.
    ///
    /// Resident content is discarded without write-back. Never fails:
    /// a failing delete in the file is logged and swallowed.
    pub fn dispose_page<F>(&self, file: &F, page_no: PageId)
    where
        F: PageFile + ?Sized,
    {
        let file_id = file.id();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(frame_id) = state.index.remove(file_id, page_no) {
            state.descriptors[frame_id.0].clear();
            state.files.release(file_id);
            debug!(file = file.name(), %page_no, %frame_id, "disposed resident page");
        }

        if let Err(err) = file.delete_page(page_no) {
            warn!(file = file.name(), %page_no, error = %err, "dispose: delete_page failed");
        }
    }

    // ========================================================================
    // Public API: diagnostics and queries
    // ========================================================================

    /// Snapshot of every frame plus the number of valid frames.
    pub fn describe(&self) -> PoolDescription {
        let state = self.state.lock();

        let frames: Vec<FrameStatus> = state
            .descriptors
            .iter()
            .map(|desc| FrameStatus {
                frame_id: desc.frame_id(),
                owner: desc.owner(),
                file_name: desc.owner().map(|owner| state.files.name_of(owner)),
                page_no: desc.page_no(),
                valid: desc.is_valid(),
                dirty: desc.is_dirty(),
                referenced: desc.is_referenced(),
                pin_count: desc.pin_count(),
            })
            .collect();
        let valid_frames = frames.iter().filter(|f| f.valid).count();

        PoolDescription {
            frames,
            valid_frames,
        }
    }

    /// Get the pool size.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn config(&self) -> &BufferPoolConfig {
        &self.config
    }

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Frame holding page `page_no` of `file`, if resident.
    pub fn frame_of<F>(&self, file: &F, page_no: PageId) -> Option<FrameId>
    where
        F: PageFile + ?Sized,
    {
        self.state.lock().index.lookup(file.id(), page_no)
    }

    /// Pin count of page `page_no` of `file`, if resident.
    pub fn pin_count<F>(&self, file: &F, page_no: PageId) -> Option<u32>
    where
        F: PageFile + ?Sized,
    {
        let state = self.state.lock();
        let frame_id = state.index.lookup(file.id(), page_no)?;
        Some(state.descriptors[frame_id.0].pin_count())
    }

    /// Dirty flag of page `page_no` of `file`, if resident.
    pub fn is_dirty<F>(&self, file: &F, page_no: PageId) -> Option<bool>
    where
        F: PageFile + ?Sized,
    {
        let state = self.state.lock();
        let frame_id = state.index.lookup(file.id(), page_no)?;
        Some(state.descriptors[frame_id.0].is_dirty())
    }

    /// Number of pages currently resident.
    pub fn resident_pages(&self) -> usize {
        self.state.lock().index.len()
    }

    // ========================================================================
    // Internal
    // ========================================================================

    #[inline]
    pub(crate) fn frame(&self, frame_id: FrameId) -> &Frame {
        &self.frames[frame_id.0]
    }

    /// Index a page just placed in `frame_id` and pin it once.
    fn install<F>(
        &self,
        state: &mut PoolState,
        file: &Arc<F>,
        page_no: PageId,
        frame_id: FrameId,
    ) -> Result<()>
    where
        F: PageFile + ?Sized + 'static,
    {
        let file_id = file.id();
        state.index.insert(file_id, page_no, frame_id)?;
        state.descriptors[frame_id.0].set(file_id, page_no);
        // `Arc<F>` is itself a sized `PageFile`, which lets unsized `F` coerce
        state
            .files
            .acquire(file_id, || Arc::new(Arc::clone(file)) as Arc<dyn PageFile>);
        Ok(())
    }

    /// Obtain a frame for a new page, evicting one if necessary.
    ///
    /// The returned frame is always invalid: either it was free, or its page
    /// has been written back (if dirty), unindexed, and its descriptor reset.
    fn allocate_frame(&self, state: &mut PoolState) -> Result<FrameId> {
        let victim = state
            .replacer
            .next_victim(&mut state.descriptors)
            .ok_or(Error::PoolExhausted {
                num_frames: self.frames.len(),
            })?;

        match victim {
            Victim::Free(frame_id) => Ok(frame_id),
            Victim::Evict(frame_id) => {
                self.evict(state, frame_id)?;
                Ok(frame_id)
            }
        }
    }

    /// Write back (if dirty) and unindex the page in `frame_id`.
    ///
    /// The index entry is removed only after a successful write, so a failed
    /// write-back leaves the page resident, mapped and dirty.
    fn evict(&self, state: &mut PoolState, frame_id: FrameId) -> Result<()> {
        let desc = &state.descriptors[frame_id.0];
        let Some((owner, page_no)) = desc.key() else {
            return Err(Error::CorruptFrame {
                frame_id,
                dirty: desc.is_dirty(),
                valid: desc.is_valid(),
                referenced: desc.is_referenced(),
            });
        };

        if desc.is_dirty() {
            let file = state.files.get(owner).ok_or(Error::UnknownFile(owner))?;
            file.write_page(&self.frames[frame_id.0].page())?;
            state.descriptors[frame_id.0].clear_dirty();
            self.stats.record_write();
        }

        state.index.remove(owner, page_no);
        state.descriptors[frame_id.0].clear();
        state.files.release(owner);
        self.stats.record_eviction();

        debug!(file_id = %owner, %page_no, %frame_id, "evicted page");
        Ok(())
    }
}
