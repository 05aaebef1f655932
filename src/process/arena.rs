/*!
 * Process Arena
 * Generational slot storage backing process handles
 *
 * The arena only stores process objects so handles can be dereferenced and
 * checked for staleness. It is never scanned to discover processes: lookup
 * goes through the live thread population.
 */

use super::handle::ProcessHandle;
use super::types::ProcessState;
use crate::core::data_structures::ModuleName;
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::types::{ExitStatus, Pid, Size, Uid};
use parking_lot::RwLock;
use std::sync::Arc;

/// Process object as stored in the arena
#[derive(Debug)]
pub(super) struct ProcessEntry {
    pub id: Pid,
    pub name: Arc<str>,
    pub module_name: ModuleName,
    /// Module the object's storage was charged to at creation
    pub charged_module: ModuleName,
    pub parent: Option<ProcessHandle>,
    pub uid: Uid,
    pub working_dir: Option<String>,
    pub exit_status: ExitStatus,
    pub state: ProcessState,
}

impl ProcessEntry {
    /// Bytes charged for the owned strings (the object itself is accounted separately)
    #[inline]
    pub fn owned_bytes(&self) -> Size {
        self.name.len() + self.working_dir.as_ref().map_or(0, String::len)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<ProcessEntry>,
}

#[derive(Debug, Default)]
struct Slots {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

/// Slot storage with generation checks
#[derive(Debug, Default)]
pub(super) struct ProcessArena {
    inner: RwLock<Slots>,
}

impl ProcessArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully initialized entry and hand out its handle
    pub fn insert(&self, entry: ProcessEntry) -> ProcessResult<ProcessHandle> {
        let mut inner = self.inner.write();

        if let Some(index) = inner.free.pop() {
            let slot = &mut inner.slots[index as usize];
            slot.entry = Some(entry);
            return Ok(ProcessHandle::new(index, slot.generation));
        }

        let index = u32::try_from(inner.slots.len()).map_err(|_| {
            ProcessError::OutOfMemory("process arena has no free slots".to_string())
        })?;
        inner.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        Ok(ProcessHandle::new(index, 0))
    }

    /// Read an entry if the handle is still live
    pub fn with<R>(&self, handle: ProcessHandle, f: impl FnOnce(&ProcessEntry) -> R) -> Option<R> {
        let inner = self.inner.read();
        inner
            .slots
            .get(handle.slot())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.entry.as_ref())
            .map(f)
    }

    /// Mutate an entry if the handle is still live
    pub fn with_mut<R>(
        &self,
        handle: ProcessHandle,
        f: impl FnOnce(&mut ProcessEntry) -> R,
    ) -> Option<R> {
        let mut inner = self.inner.write();
        inner
            .slots
            .get_mut(handle.slot())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.entry.as_mut())
            .map(f)
    }

    /// Check if the handle refers to a live entry
    #[inline]
    pub fn contains(&self, handle: ProcessHandle) -> bool {
        self.with(handle, |_| ()).is_some()
    }

    /// Take the entry out and retire the handle
    ///
    /// The slot's generation moves on before the slot is recycled, so every
    /// outstanding copy of `handle` becomes stale.
    pub fn remove(&self, handle: ProcessHandle) -> Option<ProcessEntry> {
        let mut inner = self.inner.write();
        let slot = inner
            .slots
            .get_mut(handle.slot())
            .filter(|slot| slot.generation == handle.generation())?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        inner.free.push(handle.slot() as u32);
        Some(entry)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let inner = self.inner.read();
        inner.slots.len() - inner.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: Pid) -> ProcessEntry {
        let module = ModuleName::new("test", 32).unwrap();
        ProcessEntry {
            id,
            name: Arc::from("proc"),
            module_name: module.clone(),
            charged_module: module,
            parent: None,
            uid: 0,
            working_dir: None,
            exit_status: 0,
            state: ProcessState::Running,
        }
    }

    #[test]
    fn test_insert_and_read() {
        let arena = ProcessArena::new();
        let handle = arena.insert(entry(7)).unwrap();

        assert_eq!(arena.with(handle, |e| e.id), Some(7));
        assert!(arena.contains(handle));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_stale_handle_after_remove() {
        let arena = ProcessArena::new();
        let handle = arena.insert(entry(1)).unwrap();

        assert!(arena.remove(handle).is_some());
        assert!(!arena.contains(handle));
        assert!(arena.remove(handle).is_none());
        assert_eq!(arena.with_mut(handle, |e| e.uid = 5), None);
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn test_reused_slot_rejects_old_handle() {
        let arena = ProcessArena::new();
        let old = arena.insert(entry(1)).unwrap();
        arena.remove(old);

        let new = arena.insert(entry(2)).unwrap();
        assert_ne!(old, new);
        assert_eq!(arena.with(old, |e| e.id), None);
        assert_eq!(arena.with(new, |e| e.id), Some(2));
    }

    #[test]
    fn test_owned_bytes() {
        let mut e = entry(1);
        assert_eq!(e.owned_bytes(), 4);
        e.working_dir = Some("/tmp".to_string());
        assert_eq!(e.owned_bytes(), 8);
    }
}
