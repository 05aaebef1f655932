/*!
 * Process Manager Lifecycle
 * Kill and destroy orchestration over the thread subsystem
 */

use super::handle::ProcessHandle;
use super::manager::{invalid_handle, Label, ProcessManager, OBJECT_FOOTPRINT};
use super::types::ProcessState;
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::types::{ExitStatus, ThreadId};
use log::{debug, error, warn};

impl ProcessManager {
    /// Terminate every thread owned by `process`
    ///
    /// Not atomic against concurrent thread creation: threads spawned after
    /// the enumeration survive. Stops at the first thread that cannot be
    /// terminated; threads terminated before it stay terminated.
    pub(super) fn kill_threads(
        &self,
        process: ProcessHandle,
        status: ExitStatus,
        label: &Label,
    ) -> ProcessResult<()> {
        let count = self.threads.count_threads_of(process);
        if count == 0 {
            return Ok(());
        }

        let mut threads: Vec<ThreadId> = Vec::new();
        if threads.try_reserve_exact(count).is_err() {
            error!(
                "Failed to allocate memory for thread handles while killing {}",
                label
            );
            return Err(ProcessError::OperationFault(format!(
                "no memory to enumerate {} threads of {}",
                count, label
            )));
        }
        threads.resize(count, ThreadId::default());

        let actual = self.threads.list_threads_of(process, &mut threads);
        if actual != count {
            warn!(
                "Thread count mismatch while killing {}: expected {}, got {}",
                label, count, actual
            );
        }

        let listed = actual.min(count);
        for &thread in &threads[..listed] {
            if let Err(e) = self.threads.terminate_thread(thread, status) {
                error!("Failed to kill thread {} in {}: {}", thread, label, e);
                return Err(ProcessError::OperationFault(format!(
                    "failed to terminate thread {} of {}: {}",
                    thread, label, e
                )));
            }
        }

        debug!("Terminated {} threads of {} with status {}", listed, label, status);
        Ok(())
    }

    /// Terminate all threads of a process and mark it terminated
    ///
    /// On `OperationFault` some threads may already be gone while the state
    /// still reads `Running`; callers must re-check the state.
    pub fn kill(&self, process: ProcessHandle, status: ExitStatus) -> ProcessResult<()> {
        let _critical = self.lifecycle.lock();

        let label = self
            .label(process)
            .ok_or_else(|| invalid_handle("kill", process))?;
        debug!("Killing {} with status {}", label, status);

        if let Err(e) = self.kill_threads(process, status, &label) {
            error!("Failed to kill threads while killing {}", label);
            return Err(e);
        }

        self.arena
            .with_mut(process, |e| {
                e.exit_status = status;
                e.state = ProcessState::Terminated;
            })
            .ok_or_else(|| invalid_handle("kill", process))
    }

    /// Terminate all threads of a process and release it
    ///
    /// Destruction is unconditional once the handle is valid: a thread that
    /// refuses termination is logged and the object is released anyway. Every
    /// copy of `process` is stale afterwards.
    pub fn destroy(&self, process: ProcessHandle) -> ProcessResult<()> {
        let _critical = self.lifecycle.lock();

        let Some((label, status)) = self
            .arena
            .with(process, |e| (Label::new(&e.name, &e.module_name), e.exit_status))
        else {
            error!("Cannot destroy invalid process handle {}", process);
            return Err(ProcessError::InvalidArgument(format!(
                "invalid process handle {} (destroy)",
                process
            )));
        };
        debug!("Destroying {}", label);

        if let Err(e) = self.kill_threads(process, status, &label) {
            error!("Failed to kill threads while destroying {}: {}", label, e);
        }

        // Waiters polling between these two steps observe the termination
        self.arena
            .with_mut(process, |e| e.state = ProcessState::Terminated);

        match self.arena.remove(process) {
            Some(entry) => {
                self.memory.release(
                    &entry.charged_module,
                    OBJECT_FOOTPRINT + entry.owned_bytes(),
                );
                debug!("Destroyed {} (PID: {})", label, entry.id);
                Ok(())
            }
            // Unreachable while the lifecycle lock is held
            None => Err(invalid_handle("destroy", process)),
        }
    }
}
