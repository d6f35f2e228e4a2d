//! In-Memory Store

use crate::{HistoryStore, StoreError};
use perfmark_core::Measurement;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Store keeping histories in a shared map
///
/// Clones share the same map, so a test can keep one handle while the helper
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    histories: Arc<Mutex<BTreeMap<String, Vec<Measurement>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with histories
    pub fn with_histories(histories: BTreeMap<String, Vec<Measurement>>) -> Self {
        Self {
            histories: Arc::new(Mutex::new(histories)),
        }
    }

    /// Stored history of one identifier
    pub fn get(&self, identifier: &str) -> Option<Vec<Measurement>> {
        self.lock().get(identifier).cloned()
    }

    /// Number of identifiers stored
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<Measurement>>> {
        self.histories.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HistoryStore for MemoryStore {
    fn load_all(&self) -> Result<BTreeMap<String, Vec<Measurement>>, StoreError> {
        Ok(self.lock().clone())
    }

    fn load(&self, identifier: &str) -> Result<Option<Vec<Measurement>>, StoreError> {
        Ok(self.get(identifier))
    }

    fn save(&mut self, identifier: &str, history: &[Measurement]) -> Result<(), StoreError> {
        let mut histories = self.lock();
        if history.is_empty() {
            histories.remove(identifier);
        } else {
            histories.insert(identifier.to_string(), history.to_vec());
        }
        Ok(())
    }

    fn remove(&mut self, identifier: &str) -> Result<bool, StoreError> {
        Ok(self.lock().remove(identifier).is_some())
    }
}
