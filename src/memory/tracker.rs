/*!
 * Module Memory Tracker
 * Per-module byte accounting with an optional global budget
 */

use super::traits::{MemoryAccounting, MemoryInfo};
use super::types::{MemoryError, MemoryResult, MemoryStats};
use crate::core::types::Size;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Tracks how many bytes each module holds
///
/// # Performance
/// - Budget reservation is a lock-free CAS loop on the global counter
/// - Per-module totals live in a sharded `DashMap`
pub struct ModuleMemoryTracker {
    usage: DashMap<String, Size>,
    used: AtomicUsize,
    capacity: Option<Size>,
}

impl ModuleMemoryTracker {
    /// Tracker without a budget
    pub fn new() -> Self {
        info!("Module memory tracker initialized (unlimited)");
        Self {
            usage: DashMap::new(),
            used: AtomicUsize::new(0),
            capacity: None,
        }
    }

    /// Tracker that refuses charges beyond `capacity` bytes in total
    pub fn with_capacity(capacity: Size) -> Self {
        info!("Module memory tracker initialized with {} bytes", capacity);
        Self {
            usage: DashMap::new(),
            used: AtomicUsize::new(0),
            capacity: Some(capacity),
        }
    }

    fn reserve(&self, module: &str, bytes: Size) -> MemoryResult<()> {
        let Some(capacity) = self.capacity else {
            self.used.fetch_add(bytes, Ordering::AcqRel);
            return Ok(());
        };

        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|&next| next <= capacity)
            })
            .map(|_| ())
            .map_err(|used| MemoryError::OutOfMemory {
                module: module.to_string(),
                requested: bytes,
                available: capacity.saturating_sub(used),
            })
    }
}

impl Default for ModuleMemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAccounting for ModuleMemoryTracker {
    fn charge(&self, module: &str, bytes: Size) -> MemoryResult<()> {
        if let Err(e) = self.reserve(module, bytes) {
            warn!("{}", e);
            return Err(e);
        }

        self.usage
            .entry(module.to_string())
            .and_modify(|v| *v += bytes)
            .or_insert(bytes);
        debug!("Charged {} bytes to module {}", bytes, module);
        Ok(())
    }

    fn release(&self, module: &str, bytes: Size) {
        let released = match self.usage.get_mut(module) {
            Some(mut entry) => {
                let released = bytes.min(*entry);
                *entry -= released;
                let drained = *entry == 0;
                drop(entry);
                if drained {
                    self.usage.remove_if(module, |_, v| *v == 0);
                }
                released
            }
            None => 0,
        };

        if released < bytes {
            warn!(
                "Module {} released {} bytes but only {} were charged",
                module, bytes, released
            );
        }

        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(released))
            });
        debug!("Released {} bytes from module {}", released, module);
    }
}

impl MemoryInfo for ModuleMemoryTracker {
    fn stats(&self) -> MemoryStats {
        MemoryStats {
            used_memory: self.used.load(Ordering::Acquire),
            capacity: self.capacity,
            modules: self.usage.len(),
        }
    }

    fn module_memory(&self, module: &str) -> Size {
        self.usage.get(module).map(|r| *r.value()).unwrap_or(0)
    }
}
