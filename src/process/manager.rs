/*!
 * Process Management
 * Handles process creation, metadata access and teardown bookkeeping
 */

use super::arena::{ProcessArena, ProcessEntry};
use super::handle::ProcessHandle;
use super::manager_builder::ProcessManagerBuilder;
use super::types::{ProcessInfo, ProcessState};
use crate::core::config::ProcessConfig;
use crate::core::data_structures::ModuleName;
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::id::PidGenerator;
use crate::core::limits::{DEFAULT_WORKING_DIR, SYSTEM_MODULE_NAME};
use crate::core::types::{ExitStatus, Pid, Size, Uid};
use crate::memory::MemoryAccounting;
use crate::thread::ThreadSubsystem;
use log::{debug, error};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Bytes charged to the owning module for the process object itself
pub const OBJECT_FOOTPRINT: Size = std::mem::size_of::<ProcessEntry>();

pub struct ProcessManager {
    pub(super) arena: ProcessArena,
    pub(super) next_pid: PidGenerator,
    pub(super) threads: Arc<dyn ThreadSubsystem>,
    pub(super) memory: Arc<dyn MemoryAccounting>,
    pub(super) config: ProcessConfig,
    // Serializes the enumerate-then-terminate sequences of kill and destroy
    pub(super) lifecycle: Mutex<()>,
}

/// "process <name> of module <module>" for log lines
pub(super) struct Label {
    name: Arc<str>,
    module: ModuleName,
}

impl Label {
    pub(super) fn new(name: &Arc<str>, module: &ModuleName) -> Self {
        Self {
            name: Arc::clone(name),
            module: module.clone(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "process {} of module {}", self.name, self.module)
    }
}

pub(super) fn invalid_handle(op: &str, process: ProcessHandle) -> ProcessError {
    error!("Invalid process handle {} provided to {}", process, op);
    ProcessError::InvalidArgument(format!("invalid process handle {} ({})", process, op))
}

impl ProcessManager {
    /// Create a ProcessManager over a fresh thread table and unlimited accounting
    pub fn new() -> Self {
        ProcessManagerBuilder::new().build()
    }

    /// Create a builder for constructing a ProcessManager
    pub fn builder() -> ProcessManagerBuilder {
        ProcessManagerBuilder::new()
    }

    /// Active configuration
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Thread subsystem this manager drives
    pub fn threads(&self) -> &Arc<dyn ThreadSubsystem> {
        &self.threads
    }

    pub(super) fn label(&self, process: ProcessHandle) -> Option<Label> {
        self.arena
            .with(process, |e| Label::new(&e.name, &e.module_name))
    }

    /// Create a process
    ///
    /// `module_name` defaults to `"system"`. `parent` is stored as a
    /// non-owning link and is not checked for liveness.
    pub fn create(
        &self,
        name: &str,
        module_name: Option<&str>,
        parent: Option<ProcessHandle>,
    ) -> ProcessResult<ProcessHandle> {
        if name.is_empty() {
            error!("Process name cannot be empty");
            return Err(ProcessError::InvalidArgument(
                "Process name cannot be empty".to_string(),
            ));
        }

        let module = ModuleName::new(
            module_name.unwrap_or(SYSTEM_MODULE_NAME),
            self.config.max_module_name_len,
        )
        .map_err(|e| {
            error!("Cannot create process {}: {}", name, e);
            e
        })?;

        if let Err(e) = self.memory.charge(&module, OBJECT_FOOTPRINT) {
            error!(
                "Failed to allocate memory for process {} of module {}",
                name, module
            );
            return Err(e.into());
        }
        if let Err(e) = self.memory.charge(&module, name.len()) {
            error!(
                "Failed to duplicate process name {} for module {}",
                name, module
            );
            self.memory.release(&module, OBJECT_FOOTPRINT);
            return Err(e.into());
        }

        let Some(pid) = self.next_pid.try_next() else {
            error!("Process id space exhausted while creating process {}", name);
            self.memory.release(&module, OBJECT_FOOTPRINT + name.len());
            return Err(ProcessError::OutOfMemory(
                "process id space exhausted".to_string(),
            ));
        };

        let entry = ProcessEntry {
            id: pid,
            name: Arc::from(name),
            module_name: module.clone(),
            charged_module: module.clone(),
            parent,
            uid: 0,
            working_dir: None,
            exit_status: 0,
            state: ProcessState::Running,
        };

        match self.arena.insert(entry) {
            Ok(handle) => {
                debug!(
                    "Created process: {} of module {} (PID: {}, handle: {})",
                    name, module, pid, handle
                );
                Ok(handle)
            }
            Err(e) => {
                error!("Failed to store process {} of module {}: {}", name, module, e);
                self.memory.release(&module, OBJECT_FOOTPRINT + name.len());
                Err(e)
            }
        }
    }

    /// Process running on the caller's thread
    pub fn current(&self) -> Option<ProcessHandle> {
        let Some(thread) = self.threads.current_thread() else {
            error!("Failed to get current thread while retrieving current process");
            return None;
        };

        match self.threads.owning_process_of(thread) {
            Some(process) if self.arena.contains(process) => Some(process),
            _ => {
                error!("Current thread {} does not belong to any process", thread);
                None
            }
        }
    }

    /// Check if a handle refers to a live process
    #[inline]
    pub fn is_valid(&self, process: ProcessHandle) -> bool {
        self.arena.contains(process)
    }

    /// Number of process objects currently allocated
    pub fn object_count(&self) -> usize {
        self.arena.len()
    }

    /// Copy of every field, for diagnostics
    pub fn snapshot(&self, process: ProcessHandle) -> Option<ProcessInfo> {
        let (mut snapshot, parent) = self.arena.with(process, |e| {
            (
                ProcessInfo {
                    pid: e.id,
                    name: e.name.to_string(),
                    module_name: e.module_name.clone(),
                    parent_pid: None,
                    uid: e.uid,
                    working_dir: e
                        .working_dir
                        .clone()
                        .unwrap_or_else(|| DEFAULT_WORKING_DIR.to_string()),
                    exit_status: e.exit_status,
                    state: e.state,
                },
                e.parent,
            )
        })?;

        // Parent resolved outside the first read; it may be gone already
        if let Some(parent) = parent {
            snapshot.parent_pid = self.arena.with(parent, |p| p.id);
        }
        Some(snapshot)
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    /// Exit status, `InvalidArgument` for an invalid handle
    pub fn get_exit_status(&self, process: ProcessHandle) -> ProcessResult<ExitStatus> {
        self.arena
            .with(process, |e| e.exit_status)
            .ok_or_else(|| invalid_handle("get exit status", process))
    }

    /// State, `InvalidArgument` for an invalid handle
    pub fn get_state(&self, process: ProcessHandle) -> ProcessResult<ProcessState> {
        self.arena
            .with(process, |e| e.state)
            .ok_or_else(|| invalid_handle("get state", process))
    }

    /// Process id, `0` for an invalid handle
    pub fn get_id(&self, process: ProcessHandle) -> Pid {
        self.arena.with(process, |e| e.id).unwrap_or_else(|| {
            invalid_handle("get ID", process);
            0
        })
    }

    /// Process name, `None` for an invalid handle
    pub fn get_name(&self, process: ProcessHandle) -> Option<Arc<str>> {
        let name = self.arena.with(process, |e| Arc::clone(&e.name));
        if name.is_none() {
            invalid_handle("get name", process);
        }
        name
    }

    /// Owning module name, `None` for an invalid handle
    pub fn get_module_name(&self, process: ProcessHandle) -> Option<ModuleName> {
        let module = self.arena.with(process, |e| e.module_name.clone());
        if module.is_none() {
            invalid_handle("get module name", process);
        }
        module
    }

    /// Parent link, `None` for an invalid handle or a detached process
    ///
    /// The returned handle may itself be stale if the parent was destroyed.
    pub fn get_parent(&self, process: ProcessHandle) -> Option<ProcessHandle> {
        match self.arena.with(process, |e| e.parent) {
            Some(parent) => parent,
            None => {
                invalid_handle("get parent", process);
                None
            }
        }
    }

    /// User id, `0` for an invalid handle
    pub fn get_uid(&self, process: ProcessHandle) -> Uid {
        self.arena.with(process, |e| e.uid).unwrap_or_else(|| {
            invalid_handle("get UID", process);
            0
        })
    }

    /// Working directory (`"/"` when never set), `None` for an invalid handle
    pub fn get_pwd(&self, process: ProcessHandle) -> Option<String> {
        let pwd = self.arena.with(process, |e| {
            e.working_dir
                .clone()
                .unwrap_or_else(|| DEFAULT_WORKING_DIR.to_string())
        });
        if pwd.is_none() {
            invalid_handle("get working directory", process);
        }
        pwd
    }

    // ------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------

    pub fn set_uid(&self, process: ProcessHandle, uid: Uid) -> ProcessResult<()> {
        self.arena
            .with_mut(process, |e| e.uid = uid)
            .ok_or_else(|| invalid_handle("set UID", process))
    }

    /// Remap the process id (restoring ids is the caller's business, no
    /// uniqueness check is made)
    pub fn set_id(&self, process: ProcessHandle, pid: Pid) -> ProcessResult<()> {
        self.arena
            .with_mut(process, |e| {
                debug!("Setting process ID of {} to {}", e.name, pid);
                e.id = pid;
            })
            .ok_or_else(|| invalid_handle("set process ID", process))
    }

    pub fn set_module_name(&self, process: ProcessHandle, module_name: &str) -> ProcessResult<()> {
        if !self.arena.contains(process) {
            return Err(invalid_handle("set module name", process));
        }

        let module =
            ModuleName::new(module_name, self.config.max_module_name_len).map_err(|e| {
                error!("Rejected module name for process handle {}: {}", process, e);
                e
            })?;

        self.arena
            .with_mut(process, |e| {
                debug!("Setting module name of process {} to {}", e.name, module);
                e.module_name = module;
            })
            .ok_or_else(|| invalid_handle("set module name", process))
    }

    /// Replace the working directory
    ///
    /// The previous value is released before the new copy is charged; if the
    /// charge fails the process is left without a working directory (reports
    /// `"/"`) and `OutOfMemory` is returned.
    pub fn set_pwd(&self, process: ProcessHandle, pwd: &str) -> ProcessResult<()> {
        if !self.arena.contains(process) {
            return Err(invalid_handle("set working directory", process));
        }
        if pwd.is_empty() {
            error!("Working directory cannot be empty");
            return Err(ProcessError::InvalidArgument(
                "Working directory cannot be empty".to_string(),
            ));
        }

        let (module, previous) = self
            .arena
            .with_mut(process, |e| {
                debug!("Setting working directory of process {} to {}", e.name, pwd);
                (e.charged_module.clone(), e.working_dir.take())
            })
            .ok_or_else(|| invalid_handle("set working directory", process))?;

        if let Some(previous) = previous {
            self.memory.release(&module, previous.len());
        }

        if let Err(e) = self.memory.charge(&module, pwd.len()) {
            error!("Failed to allocate memory for working directory");
            return Err(e.into());
        }

        let replaced = self
            .arena
            .with_mut(process, |e| e.working_dir.replace(pwd.to_string()));
        match replaced {
            Some(raced) => {
                // A concurrent set_pwd stored its value in between
                if let Some(raced) = raced {
                    self.memory.release(&module, raced.len());
                }
                Ok(())
            }
            None => {
                self.memory.release(&module, pwd.len());
                Err(invalid_handle("set working directory", process))
            }
        }
    }

    pub fn set_exit_status(&self, process: ProcessHandle, exit_status: ExitStatus) -> ProcessResult<()> {
        self.arena
            .with_mut(process, |e| {
                debug!("Setting exit status of process {} to {}", e.name, exit_status);
                e.exit_status = exit_status;
            })
            .ok_or_else(|| invalid_handle("set exit status", process))
    }
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}
