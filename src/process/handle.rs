/*!
 * Process Handle
 * Generational reference to a process slot
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a process
///
/// Encodes the arena slot and the slot's generation at creation time. When a
/// process is destroyed its slot generation moves on, so every copy of the old
/// handle is detected as stale instead of reaching a reused slot.
///
/// Handles are `Copy` and non-owning: holding one (for example as a child's
/// parent link) does not keep the process alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessHandle {
    slot: u32,
    generation: u32,
}

impl ProcessHandle {
    #[inline]
    pub(super) const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    #[inline(always)]
    pub(super) const fn slot(self) -> usize {
        self.slot as usize
    }

    #[inline(always)]
    pub(super) const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.slot, self.generation)
    }
}
