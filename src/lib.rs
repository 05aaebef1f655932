/*!
 * Modular Runtime Process Library
 * Process lifecycle core exposed as a library
 *
 * A process is a logical grouping of threads with metadata. There is no
 * process table: processes are created and destroyed through handles, and
 * lookup by name or id is derived from the live thread population.
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod thread;

// Re-exports
pub use crate::core::{ModuleName, ProcessConfig, ProcessError, ProcessResult};
pub use crate::core::types::{ExitStatus, Pid, ThreadId, Uid};
pub use memory::{MemoryAccounting, ModuleMemoryTracker};
pub use process::{ProcessHandle, ProcessInfo, ProcessManager, ProcessManagerBuilder, ProcessState};
pub use thread::{ThreadSubsystem, ThreadTable};
