/*!
 * Process Manager Lookup
 * Finds processes by walking the live thread population
 *
 * There is no process index: a process is reachable here only while at least
 * one of its threads is alive. Owners are dereferenced through the arena, so a
 * process destroyed mid-scan shows up as a stale handle and is skipped.
 */

use super::arena::ProcessEntry;
use super::handle::ProcessHandle;
use super::manager::ProcessManager;
use crate::core::types::{Pid, ThreadId};
use log::{debug, error};

impl ProcessManager {
    /// Find a live process by name
    pub fn find_by_name(&self, name: &str) -> Option<ProcessHandle> {
        if name.is_empty() {
            error!("Process name cannot be empty");
            return None;
        }
        self.find_with(|e| &*e.name == name, name)
    }

    /// Find a live process by id
    pub fn find_by_id(&self, pid: Pid) -> Option<ProcessHandle> {
        if pid == 0 {
            error!("Process ID cannot be 0");
            return None;
        }
        self.find_with(|e| e.id == pid, &format!("ID {}", pid))
    }

    fn find_with(
        &self,
        predicate: impl Fn(&ProcessEntry) -> bool,
        description: &str,
    ) -> Option<ProcessHandle> {
        debug!("Searching for process: {}", description);

        let count = self.threads.count_all_live_threads();
        if count == 0 {
            return None;
        }

        let mut threads: Vec<ThreadId> = Vec::new();
        if threads.try_reserve_exact(count).is_err() {
            error!(
                "Failed to allocate memory for thread handles while searching for process: {}",
                description
            );
            return None;
        }
        threads.resize(count, ThreadId::default());

        let listed = self.threads.list_all_live_threads(&mut threads).min(count);
        threads[..listed].iter().find_map(|&thread| {
            let owner = self.threads.owning_process_of(thread)?;
            self.arena
                .with(owner, |e| predicate(e))
                .filter(|&matched| matched)
                .map(|_| owner)
        })
    }
}
