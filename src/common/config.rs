//! Configuration for clockpool.
//!
//! Page geometry is fixed at compile time; pool sizing and policy knobs are
//! carried by [`BufferPoolConfig`].

use super::error::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems, so a frame maps onto exactly
/// one virtual memory page.
pub const PAGE_SIZE: usize = 4096;

/// Bytes reserved at the start of every page for the [`PageHeader`].
///
/// [`PageHeader`]: crate::storage::page::PageHeader
pub const PAGE_HEADER_SIZE: usize = 8;

/// Bytes available to callers in every page.
pub const PAGE_DATA_SIZE: usize = PAGE_SIZE - PAGE_HEADER_SIZE;

/// What `flush_file` does when its scan meets a frame that holds no page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InvalidFramePolicy {
    /// Fail with [`Error::CorruptFrame`], whoever would have owned the frame.
    #[default]
    Reject,
    /// Step over invalid frames; only frames owned by the file are inspected.
    Skip,
}

/// Construction parameters for a [`BufferPool`].
///
/// # Example
/// ```
/// use clockpool::{BufferPoolConfig, InvalidFramePolicy};
///
/// let config = BufferPoolConfig::new(64).with_invalid_frame_policy(InvalidFramePolicy::Skip);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.index_capacity(), 77);
/// ```
///
/// [`BufferPool`]: crate::buffer::BufferPool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool.
    pub num_frames: usize,
    /// Handling of invalid frames during `flush_file`.
    pub invalid_frame_policy: InvalidFramePolicy,
}

impl BufferPoolConfig {
    /// A config with `num_frames` frames and the default policies.
    pub fn new(num_frames: usize) -> Self {
        Self {
            num_frames,
            invalid_frame_policy: InvalidFramePolicy::default(),
        }
    }

    pub fn with_invalid_frame_policy(mut self, policy: InvalidFramePolicy) -> Self {
        self.invalid_frame_policy = policy;
        self
    }

    /// Check that the config describes a usable pool.
    pub fn validate(&self) -> Result<()> {
        if self.num_frames == 0 {
            return Err(Error::InvalidConfig(
                "num_frames must be greater than zero".to_string(),
            ));
        }
        if self.num_frames > u32::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "num_frames {} exceeds the addressable frame count",
                self.num_frames
            )));
        }
        Ok(())
    }

    /// Initial capacity of the page index.
    ///
    /// About 1.2 entries per frame, forced odd to spread keys across buckets.
    pub fn index_capacity(&self) -> usize {
        let scaled = self.num_frames + self.num_frames / 5;
        scaled | 1
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_DATA_SIZE + PAGE_HEADER_SIZE, PAGE_SIZE);
    }

    #[test]
    fn test_zero_frames_rejected() {
        let err = BufferPoolConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_index_capacity_is_odd() {
        assert_eq!(BufferPoolConfig::new(1).index_capacity(), 1);
        assert_eq!(BufferPoolConfig::new(10).index_capacity(), 13);
        assert_eq!(BufferPoolConfig::new(100).index_capacity(), 121);
        for n in 1..200 {
            assert_eq!(BufferPoolConfig::new(n).index_capacity() % 2, 1);
        }
    }

    #[test]
    fn test_default_policy_rejects() {
        let config = BufferPoolConfig::new(8);
        assert_eq!(config.invalid_frame_policy, InvalidFramePolicy::Reject);

        let config = config.with_invalid_frame_policy(InvalidFramePolicy::Skip);
        assert_eq!(config.invalid_frame_policy, InvalidFramePolicy::Skip);
    }
}
