/*!
 * Process Core Configuration
 *
 * Runtime configuration for the lifecycle core. Values come from defaults,
 * a JSON document supplied by the host, or environment overrides.
 */

use super::limits::{DEFAULT_MAX_MODULE_NAME_LEN, DEFAULT_WAIT_POLL_INTERVAL, MIN_MAX_MODULE_NAME_LEN};
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment override for the module name bound
pub const ENV_MAX_MODULE_NAME_LEN: &str = "PROCESS_MAX_MODULE_NAME_LEN";
/// Environment override for the wait poll interval (milliseconds)
pub const ENV_WAIT_POLL_MS: &str = "PROCESS_WAIT_POLL_MS";
/// Environment override for the accounting capacity (bytes)
pub const ENV_MEMORY_CAPACITY: &str = "PROCESS_MEMORY_CAPACITY";

/// Process core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ProcessConfig {
    /// Module names of this length or longer are rejected
    pub max_module_name_len: usize,
    /// Granularity of the `wait` poll loop
    pub wait_poll_interval_ms: u64,
    /// Byte budget of the bundled memory tracker (`None` = unlimited)
    pub memory_capacity: Option<usize>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            max_module_name_len: DEFAULT_MAX_MODULE_NAME_LEN,
            wait_poll_interval_ms: DEFAULT_WAIT_POLL_INTERVAL.as_millis() as u64,
            memory_capacity: None,
        }
    }
}

impl ProcessConfig {
    /// Parse configuration from JSON, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }

    /// Defaults with environment overrides applied
    ///
    /// Environment variables:
    /// - PROCESS_MAX_MODULE_NAME_LEN: module name bound (default: 32)
    /// - PROCESS_WAIT_POLL_MS: wait poll interval in ms (default: 100)
    /// - PROCESS_MEMORY_CAPACITY: accounting budget in bytes (default: unlimited)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(len) = env_number::<usize>(ENV_MAX_MODULE_NAME_LEN) {
            config.max_module_name_len = len;
        }
        if let Some(ms) = env_number::<u64>(ENV_WAIT_POLL_MS) {
            config.wait_poll_interval_ms = ms;
        }
        if let Some(capacity) = env_number::<usize>(ENV_MEMORY_CAPACITY) {
            config.memory_capacity = Some(capacity);
        }

        config.normalized()
    }

    #[inline]
    #[must_use]
    pub fn with_max_module_name_len(mut self, len: usize) -> Self {
        self.max_module_name_len = len;
        self.normalized()
    }

    /// Raise a module name bound that would reject the `"system"` default
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.max_module_name_len < MIN_MAX_MODULE_NAME_LEN {
            warn!(
                "Raising module name bound {} to {}: the default module name must fit",
                self.max_module_name_len, MIN_MAX_MODULE_NAME_LEN
            );
            self.max_module_name_len = MIN_MAX_MODULE_NAME_LEN;
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn with_wait_poll_interval(mut self, interval: Duration) -> Self {
        self.wait_poll_interval_ms = interval.as_millis() as u64;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = Some(capacity);
        self
    }

    /// Poll interval as a Duration (never zero, a zero interval would spin)
    #[inline]
    #[must_use]
    pub fn wait_poll_interval(&self) -> Duration {
        Duration::from_millis(self.wait_poll_interval_ms.max(1))
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}
