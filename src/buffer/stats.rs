//! Buffer pool statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the buffer pool.
///
/// All fields are atomic so the stats can be read while the pool is in use
/// without taking the pool lock.
///
/// # Memory Ordering
/// `Ordering::Relaxed` throughout: each counter only needs atomicity, and no
/// reader relies on ordering between different counters.
///
/// # Example
/// ```
/// use clockpool::BufferPoolStats;
///
/// let stats = BufferPoolStats::new();
/// stats.record_hit();
/// stats.record_miss();
/// assert_eq!(stats.snapshot().hit_rate(), 0.5);
/// ```
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// Fetches answered from a resident frame.
    pub cache_hits: AtomicU64,

    /// Fetches that had to read the page from its file.
    pub cache_misses: AtomicU64,

    /// Valid frames reclaimed by the clock sweep.
    pub evictions: AtomicU64,

    /// Pages read from files.
    pub pages_read: AtomicU64,

    /// Pages written back to files (eviction and flush).
    pub pages_written: AtomicU64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A miss always costs exactly one page read.
    #[inline]
    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        self.pages_read.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self) {
        self.pages_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Non-atomic copy for display and assertions.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
        }
    }

    /// Cache hit rate (0.0 to 1.0) at this instant.
    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.pages_read.store(0, Ordering::Relaxed);
        self.pages_written.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of [`BufferPoolStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
}

impl StatsSnapshot {
    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, reads: {}, writes: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.pages_read,
            self.pages_written,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_counts_a_read() {
        let stats = BufferPoolStats::new();
        stats.record_miss();
        stats.record_miss();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cache_misses, 2);
        assert_eq!(snapshot.pages_read, 2);
        assert_eq!(snapshot.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = BufferPoolStats::new();
        for _ in 0..7 {
            stats.record_hit();
        }
        for _ in 0..3 {
            stats.record_miss();
        }
        assert_eq!(stats.snapshot().hit_rate(), 0.7);
        assert_eq!(stats.hit_rate(), 0.7);
    }

    #[test]
    fn test_reset() {
        let stats = BufferPoolStats::new();
        stats.record_hit();
        stats.record_eviction();
        stats.record_write();

        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_display() {
        let stats = BufferPoolStats::new();
        for _ in 0..80 {
            stats.record_hit();
        }
        for _ in 0..20 {
            stats.record_miss();
        }
        stats.record_eviction();

        let display = stats.snapshot().to_string();
        assert!(display.contains("hits: 80"));
        assert!(display.contains("misses: 20"));
        assert!(display.contains("evictions: 1"));
        assert!(display.contains("80.00%"));
    }
}
