/*!
 * System Limits and Constants
 *
 * Fixed contract values and the defaults behind `ProcessConfig`.
 */

use std::time::Duration;

// =============================================================================
// PROCESS METADATA
// =============================================================================

/// Module name assigned when `create` is called without one
pub const SYSTEM_MODULE_NAME: &str = "system";

/// Working directory reported for processes that never set one
pub const DEFAULT_WORKING_DIR: &str = "/";

/// Default module name bound; names of this length or longer are rejected
/// (one byte is reserved for the terminator of the C-facing layout)
pub const DEFAULT_MAX_MODULE_NAME_LEN: usize = 32;

/// Smallest accepted bound: the `"system"` default must always fit
pub const MIN_MAX_MODULE_NAME_LEN: usize = SYSTEM_MODULE_NAME.len() + 1;

// =============================================================================
// WAIT
// =============================================================================

/// Default poll interval for `wait`
pub const DEFAULT_WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A negative wait timeout blocks until termination
pub const WAIT_FOREVER: i32 = -1;

// =============================================================================
// IDS
// =============================================================================

/// First process id handed out by the allocator
pub const FIRST_PID: u32 = 1;

/// First thread id handed out by the bundled thread table
pub const FIRST_THREAD_ID: u64 = 1;

/// Exit statuses of terminated threads kept by the bundled thread table
pub const MAX_RETAINED_EXIT_STATUSES: usize = 1024;
