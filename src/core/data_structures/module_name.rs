/*!
 * Module Name
 * Bounded, inline-stored owner module identifier
 */

use crate::core::errors::{ProcessError, ProcessResult};
use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use std::fmt;

/// Name of the module that owns a process
///
/// Stored inline (no heap allocation) for names up to 23 bytes, which covers
/// the default bound. `new` enforces the configured length bound so a
/// `ModuleName` held by a process is always within it. Deserialization
/// rejects empty names but applies no length bound.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(transparent)]
pub struct ModuleName {
    inner: SmartString,
}

impl ModuleName {
    /// Validate and build a module name
    ///
    /// Rejects empty names and names whose length is `max_len` or more.
    pub fn new(name: &str, max_len: usize) -> ProcessResult<Self> {
        if name.is_empty() {
            return Err(ProcessError::InvalidArgument(
                "Module name cannot be empty".to_string(),
            ));
        }
        if name.len() >= max_len {
            return Err(ProcessError::InvalidArgument(format!(
                "Module name too long: {} ({} bytes, limit {})",
                name,
                name.len(),
                max_len.saturating_sub(1)
            )));
        }
        Ok(Self {
            inner: SmartString::from(name),
        })
    }

    /// Get string slice
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    /// Check if the name is stored inline (no heap allocation)
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.inner.is_inline()
    }
}

impl TryFrom<String> for ModuleName {
    type Error = ProcessError;

    fn try_from(name: String) -> ProcessResult<Self> {
        Self::new(&name, usize::MAX)
    }
}

impl From<ModuleName> for String {
    fn from(name: ModuleName) -> Self {
        name.inner.into()
    }
}

impl AsRef<str> for ModuleName {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::ops::Deref for ModuleName {
    type Target = str;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl std::borrow::Borrow<str> for ModuleName {
    #[inline(always)]
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for ModuleName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ModuleName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_bound() {
        let name = ModuleName::new("net_stack", 32).unwrap();
        assert_eq!(name, "net_stack");
        assert!(name.is_inline());
    }

    #[test]
    fn test_bound_is_exclusive() {
        let at_limit = "a".repeat(31);
        assert!(ModuleName::new(&at_limit, 32).is_ok());

        let over = "a".repeat(32);
        assert!(matches!(
            ModuleName::new(&over, 32),
            Err(ProcessError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(ModuleName::new("", 32).is_err());
    }

    #[test]
    fn test_serialization() {
        let name = ModuleName::new("system", 32).unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"system\"");
    }

    #[test]
    fn test_deserialization_validates() {
        let name: ModuleName = serde_json::from_str("\"network\"").unwrap();
        assert_eq!(name, "network");

        assert!(serde_json::from_str::<ModuleName>("\"\"").is_err());
    }
}
