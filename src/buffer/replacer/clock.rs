//! CLOCK (second chance) replacement policy.

use crate::buffer::frame::FrameDescriptor;
use crate::common::FrameId;

/// Outcome of a clock sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Victim {
    /// The frame holds no page and can be used as is.
    Free(FrameId),
    /// The frame holds an unpinned, unreferenced page that must be evicted
    /// (written back if dirty, unindexed) before reuse.
    Evict(FrameId),
}

impl Victim {
    pub fn frame_id(self) -> FrameId {
        match self {
            Victim::Free(id) | Victim::Evict(id) => id,
        }
    }
}

/// The clock hand and its sweep.
///
/// The replacer owns only the cursor; frame state lives in the pool's
/// descriptors and is passed in on every sweep. The hand is advanced before
/// each inspection and starts on the last frame, so the first frame handed
/// out by a fresh pool is frame 0.
///
/// For the frame under the hand:
/// 1. invalid: claim it;
/// 2. referenced: clear the bit, move on;
/// 3. pinned: move on, counting the skip;
/// 4. otherwise it is the victim.
///
/// Referenced frames are not counted because one revolution clears every
/// bit. Once more than `num_frames` pinned frames have been skipped the
/// sweep gives up.
#[derive(Debug)]
pub struct ClockReplacer {
    hand: usize,
    num_frames: usize,
}

impl ClockReplacer {
    /// # Panics
    /// Panics if `num_frames` is 0.
    pub fn new(num_frames: usize) -> Self {
        assert!(num_frames > 0, "num_frames must be > 0");
        Self {
            hand: num_frames - 1,
            num_frames,
        }
    }

    /// Frame the hand currently points at.
    #[inline]
    pub fn hand(&self) -> FrameId {
        FrameId::new(self.hand)
    }

    #[inline]
    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.num_frames;
    }

    /// Sweep for a usable frame, clearing referenced bits on the way.
    ///
    /// Returns `None` when every frame is pinned.
    pub fn next_victim(&mut self, descriptors: &mut [FrameDescriptor]) -> Option<Victim> {
        debug_assert_eq!(descriptors.len(), self.num_frames);

        let mut pinned_skips = 0;
        while pinned_skips <= self.num_frames {
            self.advance();
            let desc = &mut descriptors[self.hand];

            if !desc.is_valid() {
                return Some(Victim::Free(desc.frame_id()));
            }
            if desc.is_referenced() {
                desc.clear_referenced();
                continue;
            }
            if desc.is_pinned() {
                pinned_skips += 1;
                continue;
            }
            return Some(Victim::Evict(desc.frame_id()));
        }
        None
    }
}
