/*!
 * ID Generation
 * Lock-free monotonic counters for process and thread ids
 *
 * Ids are never recycled: a destroyed process keeps its id retired for the
 * rest of the run so a stale id can never alias a newer process.
 */

use super::types::Pid;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

// ============================================================================
// ID Generator Trait
// ============================================================================

/// Generic ID generator interface
pub trait IdGenerator<T> {
    /// Generate next ID
    fn next(&self) -> T;

    /// Get current counter value (the id the next call will return)
    fn current(&self) -> T;
}

// ============================================================================
// Atomic Counter Generator
// ============================================================================

/// Atomic counter shared by every creator
///
/// # Performance
/// - Cache-line aligned to prevent false sharing with neighbouring state
/// - `fetch_add` makes concurrent creation collision-free
#[repr(C, align(64))]
pub struct AtomicGenerator<T> {
    counter: AtomicU64,
    _marker: PhantomData<T>,
}

impl<T> AtomicGenerator<T> {
    /// Create new generator starting at given value
    #[inline]
    pub const fn new(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for AtomicGenerator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicGenerator")
            .field("next", &self.counter.load(Ordering::Relaxed))
            .finish()
    }
}

impl IdGenerator<u64> for AtomicGenerator<u64> {
    #[inline]
    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }

    #[inline]
    fn current(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Process ID Generator
// ============================================================================

/// Process id counter that refuses to wrap
///
/// `u32::MAX` is never handed out; once the counter reaches it every further
/// allocation fails instead of cycling back through `0` to live ids.
#[repr(C, align(64))]
pub struct PidGenerator {
    counter: AtomicU32,
}

impl PidGenerator {
    #[inline]
    pub const fn new(start: Pid) -> Self {
        Self {
            counter: AtomicU32::new(start),
        }
    }

    /// Allocate the next id, `None` once the id space is exhausted
    #[inline]
    pub fn try_next(&self) -> Option<Pid> {
        self.counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(1))
            .ok()
    }

    /// The id the next allocation will return
    #[inline]
    pub fn current(&self) -> Pid {
        self.counter.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for PidGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PidGenerator")
            .field("next", &self.current())
            .finish()
    }
}

// ============================================================================
// Convenience Type Aliases
// ============================================================================

/// Thread ID generator used by the bundled thread table
pub type ThreadIdGenerator = AtomicGenerator<u64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_generator() {
        let gen = ThreadIdGenerator::new(100);

        assert_eq!(gen.next(), 100);
        assert_eq!(gen.next(), 101);
        assert_eq!(gen.next(), 102);
        assert_eq!(gen.current(), 103);
    }

    #[test]
    fn test_pid_generator_sequence() {
        let gen = PidGenerator::new(1);

        assert_eq!(gen.try_next(), Some(1));
        assert_eq!(gen.try_next(), Some(2));
        assert_eq!(gen.current(), 3);
    }

    #[test]
    fn test_pid_generator_never_wraps() {
        let gen = PidGenerator::new(u32::MAX - 2);

        assert_eq!(gen.try_next(), Some(u32::MAX - 2));
        assert_eq!(gen.try_next(), Some(u32::MAX - 1));
        assert_eq!(gen.try_next(), None);
        assert_eq!(gen.try_next(), None);
        assert_eq!(gen.current(), u32::MAX);
    }

    #[test]
    fn test_concurrent_generation() {
        use std::sync::Arc;
        use std::thread;

        let gen = Arc::new(PidGenerator::new(1));
        let mut handles = vec![];

        for _ in 0..10 {
            let g = Arc::clone(&gen);
            handles.push(thread::spawn(move || {
                let mut ids = vec![];
                for _ in 0..100 {
                    ids.push(g.try_next().unwrap());
                }
                ids
            }));
        }

        let mut all_ids = vec![];
        for handle in handles {
            all_ids.extend(handle.join().unwrap());
        }

        all_ids.sort_unstable();
        all_ids.dedup();
        assert_eq!(all_ids.len(), 1000);
        assert!(!all_ids.contains(&0));
    }
}
