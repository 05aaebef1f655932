/*!
 * Core Types
 * Common types used across the process core
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process ID type
///
/// `0` is never handed out by the allocator and doubles as the
/// "no process" sentinel of `ProcessManager::get_id`.
pub type Pid = u32;

/// User/owner identifier
pub type Uid = u32;

/// Exit status code carried by kill and destroy
pub type ExitStatus = i32;

/// Size type for memory accounting
pub type Size = usize;

/// Thread identifier issued by the thread subsystem
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
