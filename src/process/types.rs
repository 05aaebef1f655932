/*!
 * Process Types
 * State machine and snapshot types for process management
 */

use crate::core::data_structures::ModuleName;
use crate::core::types::{ExitStatus, Pid, Uid};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process state
///
/// The only transition is `Running -> Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Process is alive (its threads may run)
    Running,
    /// Process was killed or is being destroyed
    Terminated,
}

impl ProcessState {
    #[inline(always)]
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, ProcessState::Terminated)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Terminated => write!(f, "TERMINATED"),
        }
    }
}

/// Point-in-time copy of a process's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub name: String,
    pub module_name: ModuleName,
    /// Id of the parent, when the parent handle is still live
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_pid: Option<Pid>,
    pub uid: Uid,
    pub working_dir: String,
    pub exit_status: ExitStatus,
    pub state: ProcessState,
}

impl ProcessInfo {
    /// Check if process is terminated
    #[inline(always)]
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }
}
