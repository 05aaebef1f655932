/*!
 * Thread Table
 * In-process thread subsystem for hosts without a native thread layer
 *
 * Threads here are bookkeeping records: an id, the owning process and a
 * protection flag. Terminating a record removes it and keeps its exit status.
 * Host OS threads can bind themselves to a record so that
 * `ProcessManager::current` resolves to the owning process.
 */

use super::traits::ThreadSubsystem;
use super::types::{ThreadError, ThreadRecord, ThreadResult};
use crate::core::id::{IdGenerator, ThreadIdGenerator};
use crate::core::limits::{FIRST_THREAD_ID, MAX_RETAINED_EXIT_STATUSES};
use crate::core::types::{ExitStatus, ThreadId};
use crate::process::ProcessHandle;
use dashmap::DashMap;
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::time::Duration;

pub struct ThreadTable {
    // Ordered so enumeration (and therefore lookup) is deterministic
    threads: RwLock<BTreeMap<ThreadId, ThreadRecord>>,
    next_id: ThreadIdGenerator,
    bindings: DashMap<std::thread::ThreadId, ThreadId>,
    // Oldest entries are evicted past MAX_RETAINED_EXIT_STATUSES
    exits: Mutex<BTreeMap<ThreadId, ExitStatus>>,
}

impl ThreadTable {
    pub fn new() -> Self {
        info!("Thread table initialized");
        Self {
            threads: RwLock::new(BTreeMap::new()),
            next_id: ThreadIdGenerator::new(FIRST_THREAD_ID),
            bindings: DashMap::new(),
            exits: Mutex::new(BTreeMap::new()),
        }
    }

    /// Register a live thread owned by `owner`
    pub fn spawn(&self, owner: Option<ProcessHandle>) -> ThreadId {
        self.insert(owner, false)
    }

    /// Register a thread that refuses termination (e.g. a runtime service thread)
    pub fn spawn_protected(&self, owner: Option<ProcessHandle>) -> ThreadId {
        self.insert(owner, true)
    }

    fn insert(&self, owner: Option<ProcessHandle>, protected: bool) -> ThreadId {
        let id = ThreadId(self.next_id.next());
        self.threads.write().insert(
            id,
            ThreadRecord {
                id,
                owner,
                protected,
            },
        );
        debug!(
            "Spawned thread {} (owner: {:?}, protected: {})",
            id, owner, protected
        );
        id
    }

    /// Allow a protected thread to be terminated
    pub fn unprotect(&self, thread: ThreadId) -> ThreadResult<()> {
        let mut threads = self.threads.write();
        let record = threads
            .get_mut(&thread)
            .ok_or(ThreadError::NotFound(thread))?;
        record.protected = false;
        Ok(())
    }

    /// Bind the calling OS thread to a live thread record
    pub fn bind_current(&self, thread: ThreadId) -> ThreadResult<()> {
        if !self.is_alive(thread) {
            return Err(ThreadError::NotFound(thread));
        }
        self.bindings.insert(std::thread::current().id(), thread);
        Ok(())
    }

    /// Remove the calling OS thread's binding
    pub fn unbind_current(&self) -> Option<ThreadId> {
        self.bindings
            .remove(&std::thread::current().id())
            .map(|(_, thread)| thread)
    }

    /// Check if a thread record is still live
    pub fn is_alive(&self, thread: ThreadId) -> bool {
        self.threads.read().contains_key(&thread)
    }

    /// Get a copy of a live thread record
    pub fn record(&self, thread: ThreadId) -> Option<ThreadRecord> {
        self.threads.read().get(&thread).copied()
    }

    /// Consume the exit status of a terminated thread
    ///
    /// Only the most recent `MAX_RETAINED_EXIT_STATUSES` terminations are kept.
    pub fn take_exit_status(&self, thread: ThreadId) -> Option<ExitStatus> {
        self.exits.lock().remove(&thread)
    }

    /// Number of exit statuses waiting to be taken
    pub fn retained_exits(&self) -> usize {
        self.exits.lock().len()
    }

    /// Number of live threads
    pub fn len(&self) -> usize {
        self.threads.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ThreadTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy ids into `out` up to its length, returning how many were offered
fn fill(out: &mut [ThreadId], ids: impl Iterator<Item = ThreadId>) -> usize {
    let mut found = 0;
    for id in ids {
        if let Some(slot) = out.get_mut(found) {
            *slot = id;
        }
        found += 1;
    }
    found
}

impl ThreadSubsystem for ThreadTable {
    fn count_threads_of(&self, process: ProcessHandle) -> usize {
        self.threads
            .read()
            .values()
            .filter(|t| t.owner == Some(process))
            .count()
    }

    fn list_threads_of(&self, process: ProcessHandle, out: &mut [ThreadId]) -> usize {
        let threads = self.threads.read();
        fill(
            out,
            threads
                .values()
                .filter(|t| t.owner == Some(process))
                .map(|t| t.id),
        )
    }

    fn terminate_thread(&self, thread: ThreadId, status: ExitStatus) -> ThreadResult<()> {
        let mut threads = self.threads.write();
        match threads.get(&thread) {
            None => return Err(ThreadError::NotFound(thread)),
            Some(record) if record.protected => {
                warn!("Refusing to terminate protected thread {}", thread);
                return Err(ThreadError::Protected(thread));
            }
            Some(_) => {}
        }
        threads.remove(&thread);
        drop(threads);

        {
            let mut exits = self.exits.lock();
            exits.insert(thread, status);
            while exits.len() > MAX_RETAINED_EXIT_STATUSES {
                exits.pop_first();
            }
        }
        self.bindings.retain(|_, bound| *bound != thread);
        debug!("Terminated thread {} with status {}", thread, status);
        Ok(())
    }

    fn count_all_live_threads(&self) -> usize {
        self.len()
    }

    fn list_all_live_threads(&self, out: &mut [ThreadId]) -> usize {
        let threads = self.threads.read();
        fill(out, threads.keys().copied())
    }

    fn owning_process_of(&self, thread: ThreadId) -> Option<ProcessHandle> {
        self.threads.read().get(&thread).and_then(|t| t.owner)
    }

    fn current_thread(&self) -> Option<ThreadId> {
        let bound = *self.bindings.get(&std::thread::current().id())?;
        self.is_alive(bound).then_some(bound)
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_enumerate() {
        let table = ThreadTable::new();
        let a = table.spawn(None);
        let b = table.spawn(None);
        assert_ne!(a, b);
        assert_eq!(table.count_all_live_threads(), 2);

        let mut buf = [ThreadId::default(); 2];
        assert_eq!(table.list_all_live_threads(&mut buf), 2);
        assert_eq!(buf, [a, b]);
    }

    #[test]
    fn test_list_reports_count_beyond_buffer() {
        let table = ThreadTable::new();
        let a = table.spawn(None);
        table.spawn(None);
        table.spawn(None);

        let mut buf = [ThreadId::default(); 1];
        assert_eq!(table.list_all_live_threads(&mut buf), 3);
        assert_eq!(buf[0], a);
    }

    #[test]
    fn test_terminate_records_exit_status() {
        let table = ThreadTable::new();
        let t = table.spawn(None);

        table.terminate_thread(t, 9).unwrap();
        assert!(!table.is_alive(t));
        assert_eq!(table.take_exit_status(t), Some(9));
        assert_eq!(table.take_exit_status(t), None);
        assert_eq!(
            table.terminate_thread(t, 9),
            Err(ThreadError::NotFound(t))
        );
    }

    #[test]
    fn test_protected_thread() {
        let table = ThreadTable::new();
        let t = table.spawn_protected(None);

        assert_eq!(table.terminate_thread(t, 0), Err(ThreadError::Protected(t)));
        assert!(table.is_alive(t));

        table.unprotect(t).unwrap();
        assert!(table.terminate_thread(t, 0).is_ok());
    }

    #[test]
    fn test_current_thread_binding() {
        let table = ThreadTable::new();
        assert_eq!(table.current_thread(), None);

        let t = table.spawn(None);
        table.bind_current(t).unwrap();
        assert_eq!(table.current_thread(), Some(t));

        // Termination drops the binding
        table.terminate_thread(t, 0).unwrap();
        assert_eq!(table.current_thread(), None);
        assert!(table.bind_current(t).is_err());
    }

    #[test]
    fn test_exit_statuses_are_bounded() {
        let table = ThreadTable::new();
        let first = table.spawn(None);
        table.terminate_thread(first, 1).unwrap();

        for _ in 0..MAX_RETAINED_EXIT_STATUSES {
            let t = table.spawn(None);
            table.terminate_thread(t, 2).unwrap();
        }

        assert_eq!(table.retained_exits(), MAX_RETAINED_EXIT_STATUSES);
        assert_eq!(table.take_exit_status(first), None);
    }
}
