/*!
 * Thread Types
 * Errors and records for the thread subsystem boundary
 */

use crate::core::types::ThreadId;
use crate::process::ProcessHandle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Thread operation result
pub type ThreadResult<T> = Result<T, ThreadError>;

/// Thread subsystem errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadError {
    #[error("Thread {0} not found")]
    NotFound(ThreadId),

    #[error("Thread {0} is protected and cannot be terminated")]
    Protected(ThreadId),
}

/// Live thread record kept by the bundled thread table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadRecord {
    pub id: ThreadId,
    pub owner: Option<ProcessHandle>,
    pub protected: bool,
}

