/*!
 * Memory Types
 * Common types for memory accounting
 */

use crate::core::types::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Out of memory: module {module} requested {requested} bytes, {available} bytes available")]
    OutOfMemory {
        module: String,
        requested: Size,
        available: Size,
    },
}

/// Memory statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub used_memory: Size,
    pub capacity: Option<Size>,
    pub modules: usize,
}

impl MemoryStats {
    /// Bytes still available, `None` when the budget is unlimited
    pub fn available(&self) -> Option<Size> {
        self.capacity
            .map(|cap| cap.saturating_sub(self.used_memory))
    }
}
