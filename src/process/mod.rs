/*!
 * Process Module
 * Process objects, lifecycle and lookup-by-derivation
 */

mod arena;
pub mod handle;
pub mod manager;
pub mod manager_builder;
mod manager_lifecycle;
mod manager_lookup;
mod manager_wait;
pub mod types;

// Re-export for convenience
pub use handle::ProcessHandle;
pub use manager::{ProcessManager, OBJECT_FOOTPRINT};
pub use manager_builder::ProcessManagerBuilder;
pub use types::{ProcessInfo, ProcessState};
