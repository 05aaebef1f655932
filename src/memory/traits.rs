/*!
 * Memory Traits
 * Allocator accounting abstractions consumed by the process core
 */

use super::types::*;
use crate::core::types::Size;

/// Storage accounting tagged by owning module
///
/// The process core charges the object, its name and its working directory
/// to the module that created it and releases the same amounts on teardown.
pub trait MemoryAccounting: Send + Sync {
    /// Charge `bytes` to `module`, failing when the budget is exhausted
    fn charge(&self, module: &str, bytes: Size) -> MemoryResult<()>;

    /// Return `bytes` previously charged to `module`
    fn release(&self, module: &str, bytes: Size);
}

/// Memory statistics provider
pub trait MemoryInfo: Send + Sync {
    /// Get overall accounting statistics
    fn stats(&self) -> MemoryStats;

    /// Bytes currently charged to a module
    fn module_memory(&self, module: &str) -> Size;
}
