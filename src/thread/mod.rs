/*!
 * Thread Module
 * Thread subsystem boundary and the bundled in-process thread table
 */

pub mod table;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use table::ThreadTable;
pub use traits::ThreadSubsystem;
pub use types::*;
