/*!
 * Core Module
 * Fundamental types, configuration, ids and error handling
 */

pub mod config;
pub mod data_structures;
pub mod errors;
pub mod id;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use config::ProcessConfig;
pub use data_structures::ModuleName;
pub use errors::*;
pub use types::*;
