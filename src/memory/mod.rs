/*!
 * Memory Module
 * Allocator accounting boundary and the bundled per-module tracker
 */

pub mod tracker;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use tracker::ModuleMemoryTracker;
pub use traits::*;
pub use types::*;
