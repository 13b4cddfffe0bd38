//! Property tests: the pool against a simple pin-count model.

use std::sync::Arc;

use clockpool::buffer::replacer::{ClockReplacer, Victim};
use clockpool::buffer::FrameDescriptor;
use clockpool::{BufferPool, Error, FileId, FrameId, MemFile, PageId};
use proptest::prelude::*;

const PAGES: u32 = 8;

#[derive(Debug, Clone)]
enum Op {
    Fetch(u32),
    Unpin(u32, bool),
    /// Fetch, store a byte, unpin dirty.
    Write(u32, u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..PAGES).prop_map(Op::Fetch),
        (0..PAGES, any::<bool>()).prop_map(|(p, dirty)| Op::Unpin(p, dirty)),
        (0..PAGES, any::<u8>()).prop_map(|(p, v)| Op::Write(p, v)),
    ]
}

/// Expected pins and contents of every page.
struct Model {
    pins: Vec<u32>,
    values: Vec<u8>,
}

impl Model {
    fn new() -> Self {
        Self {
            pins: vec![0; PAGES as usize],
            values: vec![0; PAGES as usize],
        }
    }

    fn pinned_pages(&self) -> usize {
        self.pins.iter().filter(|&&n| n > 0).count()
    }
}

proptest! {
    #[test]
    fn pool_matches_pin_model(
        num_frames in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let pool = BufferPool::new(num_frames);
        let file = Arc::new(MemFile::with_pages("model.db", PAGES));
        let mut model = Model::new();
        let mut dirty_marks = 0u64;

        for op in ops {
            match op {
                Op::Fetch(n) | Op::Write(n, _) => {
                    let page_no = PageId::new(n);
                    let resident = pool.frame_of(&file, page_no).is_some();
                    let exhausted = !resident && model.pinned_pages() == num_frames;

                    match pool.fetch(&file, page_no) {
                        Ok(handle) => {
                            prop_assert!(!exhausted);
                            prop_assert_eq!(handle.read().data()[0], model.values[n as usize]);
                            if let Op::Write(_, value) = op {
                                handle.write().data_mut()[0] = value;
                                handle.unpin(true).unwrap();
                                model.values[n as usize] = value;
                                dirty_marks += 1;
                            } else {
                                model.pins[n as usize] += 1;
                            }
                        }
                        Err(Error::PoolExhausted { .. }) => prop_assert!(exhausted),
                        Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                    }
                }
                Op::Unpin(n, dirty) => {
                    let page_no = PageId::new(n);
                    let resident = pool.frame_of(&file, page_no).is_some();
                    let result = pool.unpin(&file, page_no, dirty);

                    if model.pins[n as usize] > 0 {
                        prop_assert!(result.is_ok());
                        model.pins[n as usize] -= 1;
                        dirty_marks += dirty as u64;
                    } else if resident {
                        let is_not_pinned = matches!(result, Err(Error::NotPinned { .. }));
                        prop_assert!(is_not_pinned);
                    } else {
                        prop_assert!(result.is_ok());
                    }
                }
            }

            // pinned pages are never evicted
            for (n, &pins) in model.pins.iter().enumerate() {
                if pins > 0 {
                    prop_assert_eq!(pool.pin_count(&file, PageId::new(n as u32)), Some(pins));
                }
            }
            prop_assert!(pool.resident_pages() <= num_frames);
            prop_assert_eq!(pool.describe().valid_frames, pool.resident_pages());
        }

        // every write-back answers one dirty mark
        prop_assert!(file.io().writes <= dirty_marks);
        prop_assert_eq!(pool.stats().snapshot().pages_read, file.io().reads);
    }

    #[test]
    fn clock_never_picks_pinned_frame(
        frames in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 1..12),
        sweeps in 1usize..4,
    ) {
        let mut descs: Vec<FrameDescriptor> = frames
            .iter()
            .enumerate()
            .map(|(i, &(valid, pinned, referenced))| {
                let mut desc = FrameDescriptor::new(FrameId::new(i));
                if valid {
                    desc.set(FileId::new(1), PageId::new(i as u32));
                    if !pinned {
                        desc.unpin();
                    }
                    if !referenced {
                        desc.clear_referenced();
                    }
                }
                desc
            })
            .collect();

        let all_pinned = frames.iter().all(|&(valid, pinned, _)| valid && pinned);
        let mut clock = ClockReplacer::new(descs.len());

        for _ in 0..sweeps {
            match clock.next_victim(&mut descs) {
                Some(Victim::Free(id)) => {
                    prop_assert!(!all_pinned);
                    prop_assert!(!descs[id.0].is_valid());
                }
                Some(Victim::Evict(id)) => {
                    prop_assert!(!all_pinned);
                    let desc = &descs[id.0];
                    prop_assert!(desc.is_valid());
                    prop_assert!(!desc.is_pinned());
                    prop_assert!(!desc.is_referenced());
                }
                None => {
                    prop_assert!(all_pinned);
                    prop_assert!(descs.iter().all(|d| !d.is_referenced()));
                }
            }
        }
    }
}
