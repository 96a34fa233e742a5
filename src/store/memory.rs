//! In-memory lease store for tests and single-process embedding.

use super::LeaseStore;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Lease store backed by an in-memory map. Nothing survives the process;
/// useful for tests and for callers that do not need cross-process recovery.
#[derive(Debug, Default)]
pub struct MemoryLeaseStore {
    records: Mutex<BTreeMap<String, String>>,
}

impl MemoryLeaseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaseStore for MemoryLeaseStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.records.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.records.lock().remove(key);
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .records
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
