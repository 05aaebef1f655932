/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::Pid;
use miette::Diagnostic;
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export collaborator errors
pub use crate::memory::MemoryError;
pub use crate::thread::ThreadError;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process lifecycle errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(process::invalid_argument),
        help("The handle may be stale (process destroyed) or a required value was empty or too long.")
    )]
    InvalidArgument(String),

    #[error("Out of memory: {0}")]
    #[diagnostic(
        code(process::out_of_memory),
        help("The owning module exhausted its memory budget. Destroy unused processes.")
    )]
    OutOfMemory(String),

    #[error("Operation fault: {0}")]
    #[diagnostic(
        code(process::operation_fault),
        help("A thread could not be terminated. Re-check the process state before retrying.")
    )]
    OperationFault(String),

    #[error("Timed out after {timeout_ms} ms waiting for process {pid}")]
    #[diagnostic(
        code(process::timeout),
        help("The process is still running. Retry the wait or kill the process.")
    )]
    Timeout { pid: Pid, timeout_ms: i32 },
}

impl ProcessError {
    /// Negative errno value used by the C-facing status convention
    #[must_use]
    pub fn errno(&self) -> i32 {
        let errno = match self {
            ProcessError::InvalidArgument(_) => Errno::EINVAL,
            ProcessError::OutOfMemory(_) => Errno::ENOMEM,
            ProcessError::OperationFault(_) => Errno::EFAULT,
            ProcessError::Timeout { .. } => Errno::ETIMEDOUT,
        };
        -(errno as i32)
    }

    /// Check if this error is a wait timeout
    #[inline]
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, ProcessError::Timeout { .. })
    }
}

// Allow conversion from MemoryError to ProcessError
impl From<MemoryError> for ProcessError {
    fn from(err: MemoryError) -> Self {
        ProcessError::OutOfMemory(err.to_string())
    }
}

// A failed thread termination surfaces as a fault of the process operation
impl From<ThreadError> for ProcessError {
    fn from(err: ThreadError) -> Self {
        ProcessError::OperationFault(err.to_string())
    }
}
