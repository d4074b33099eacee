//! In-memory session backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use super::{SessionBackend, SessionError};

/// Session backend held in memory.
///
/// Clones share the same map, so a test can keep a handle while the
/// controller owns the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    rejected: HashSet<String>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later write to `key` fail.
    pub fn reject_writes_to(&self, key: &str) {
        self.lock().rejected.insert(key.to_string());
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().values.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.lock().values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut inner = self.lock();
        if inner.rejected.contains(key) {
            return Err(SessionError::Rejected(key.to_string()));
        }
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.lock().values.remove(key);
        Ok(())
    }
}
