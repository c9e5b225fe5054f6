//! Process-local key-value backend.
//!
//! Capacity accounting follows browser storage: the quota covers the sum of
//! key and value lengths (in bytes) across all slots.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;

/// In-memory key-value store with an optional byte quota.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKeyValueStore {
    slots: HashMap<String, String>,
    quota_bytes: Option<usize>,
    writes: usize,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes pushing usage past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Changes the quota for subsequent writes. Existing slots are kept.
    pub fn set_quota(&mut self, quota_bytes: Option<usize>) {
        self.quota_bytes = quota_bytes;
    }

    /// Bytes currently used by all slots.
    pub fn used_bytes(&self) -> usize {
        self.slots
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    /// Number of successful `set` calls, for asserting write behavior.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota_bytes) = self.quota_bytes {
            let current_slot = self
                .slots
                .get(key)
                .map_or(0, |existing| key.len() + existing.len());
            let required_bytes = self.used_bytes() - current_slot + key.len() + value.len();
            if required_bytes > quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    required_bytes,
                    quota_bytes,
                });
            }
        }

        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.slots.remove(key);
        Ok(())
    }
}
