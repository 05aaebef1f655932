/*!
 * Process Manager Wait
 * Polling wait for process termination
 */

use super::handle::ProcessHandle;
use super::manager::{invalid_handle, ProcessManager};
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::limits::WAIT_FOREVER;
use log::{debug, warn};
use std::time::Duration;

impl ProcessManager {
    /// Block until the process terminates or `timeout_ms` elapses
    ///
    /// A negative timeout waits forever. A timeout of zero checks once and
    /// fails immediately if the process is still running. The state is polled
    /// every `wait_poll_interval` using the thread subsystem's sleep, so the
    /// effective timeout is rounded up to a whole number of intervals.
    ///
    /// A process destroyed while being waited on counts as terminated.
    pub fn wait(&self, process: ProcessHandle, timeout_ms: i32) -> ProcessResult<()> {
        let label = self
            .label(process)
            .ok_or_else(|| invalid_handle("wait", process))?;
        debug!(
            "Waiting for {} to terminate with timeout {} ms",
            label, timeout_ms
        );

        let interval = self.config.wait_poll_interval();
        let step = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
        let mut elapsed: i64 = 0;

        loop {
            let observed = self
                .arena
                .with(process, |e| (e.id, e.state, e.exit_status));
            let Some((pid, state, status)) = observed else {
                debug!("{} was destroyed while being waited on", label);
                return Ok(());
            };
            if state.is_terminated() {
                debug!("{} has terminated with exit status {}", label, status);
                return Ok(());
            }

            if timeout_ms >= 0 && elapsed >= i64::from(timeout_ms) {
                warn!("Timeout while waiting for {} to terminate", label);
                return Err(ProcessError::Timeout { pid, timeout_ms });
            }

            self.threads.sleep(interval);
            elapsed = elapsed.saturating_add(step);
        }
    }

    /// `wait` with a `Duration` bound, `None` meaning forever
    pub fn wait_for(&self, process: ProcessHandle, timeout: Option<Duration>) -> ProcessResult<()> {
        let timeout_ms = match timeout {
            Some(timeout) => i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX),
            None => WAIT_FOREVER,
        };
        self.wait(process, timeout_ms)
    }
}
