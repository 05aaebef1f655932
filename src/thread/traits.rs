/*!
 * Thread Subsystem Traits
 * The interface the process core consumes from the runtime's thread layer
 */

use super::types::ThreadResult;
use crate::core::types::{ExitStatus, ThreadId};
use crate::process::ProcessHandle;
use std::time::Duration;

/// Thread subsystem collaborator
///
/// The process core never stores threads itself: ownership, enumeration and
/// termination all go through this interface. Buffers are caller-provided;
/// listing calls fill at most `out.len()` entries and return how many threads
/// they found, which may be larger than the buffer.
pub trait ThreadSubsystem: Send + Sync {
    /// Number of live threads owned by `process`
    fn count_threads_of(&self, process: ProcessHandle) -> usize;

    /// Fill `out` with threads owned by `process`
    fn list_threads_of(&self, process: ProcessHandle, out: &mut [ThreadId]) -> usize;

    /// Terminate a thread with the given exit status
    fn terminate_thread(&self, thread: ThreadId, status: ExitStatus) -> ThreadResult<()>;

    /// Number of live threads across all processes
    fn count_all_live_threads(&self) -> usize;

    /// Fill `out` with every live thread
    fn list_all_live_threads(&self, out: &mut [ThreadId]) -> usize;

    /// Process owning `thread`, if any
    fn owning_process_of(&self, thread: ThreadId) -> Option<ProcessHandle>;

    /// Thread the caller is running on, if the subsystem knows it
    fn current_thread(&self) -> Option<ThreadId>;

    /// Suspend the calling thread
    fn sleep(&self, duration: Duration);
}
