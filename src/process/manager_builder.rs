/*!
 * Process Manager Builder
 * Builder pattern for ProcessManager construction
 */

use super::arena::ProcessArena;
use super::manager::ProcessManager;
use crate::core::config::ProcessConfig;
use crate::core::id::PidGenerator;
use crate::core::limits::FIRST_PID;
use crate::memory::{MemoryAccounting, ModuleMemoryTracker};
use crate::thread::{ThreadSubsystem, ThreadTable};
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

/// Builder for ProcessManager
pub struct ProcessManagerBuilder {
    config: ProcessConfig,
    threads: Option<Arc<dyn ThreadSubsystem>>,
    memory: Option<Arc<dyn MemoryAccounting>>,
}

impl ProcessManagerBuilder {
    /// Create a new ProcessManager builder
    pub fn new() -> Self {
        Self {
            config: ProcessConfig::default(),
            threads: None,
            memory: None,
        }
    }

    /// Use the given configuration
    pub fn with_config(mut self, config: ProcessConfig) -> Self {
        self.config = config;
        self
    }

    /// Drive this thread subsystem instead of a private thread table
    pub fn with_threads(mut self, threads: Arc<dyn ThreadSubsystem>) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Charge storage to this accounting backend
    pub fn with_memory(mut self, memory: Arc<dyn MemoryAccounting>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Build the ProcessManager
    pub fn build(self) -> ProcessManager {
        let mut features = Vec::new();
        if self.threads.is_some() {
            features.push("external-threads");
        }
        if self.memory.is_some() {
            features.push("external-accounting");
        }

        let threads: Arc<dyn ThreadSubsystem> = match self.threads {
            Some(threads) => threads,
            None => Arc::new(ThreadTable::new()),
        };

        let config = self.config.normalized();
        let memory: Arc<dyn MemoryAccounting> = match (self.memory, config.memory_capacity) {
            (Some(memory), _) => memory,
            (None, Some(capacity)) => Arc::new(ModuleMemoryTracker::with_capacity(capacity)),
            (None, None) => Arc::new(ModuleMemoryTracker::new()),
        };

        info!(
            "Process manager initialized (module name limit {}, wait poll {:?}{}{})",
            config.max_module_name_len,
            config.wait_poll_interval(),
            if features.is_empty() { "" } else { ", with: " },
            features.join(", ")
        );

        ProcessManager {
            arena: ProcessArena::new(),
            next_pid: PidGenerator::new(FIRST_PID),
            threads,
            memory,
            config,
            lifecycle: Mutex::new(()),
        }
    }
}

impl Default for ProcessManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
