use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use super::{pattern::glob_match, KvStore, StoreError};

/// Process-local key-value store on a sharded concurrent map.
///
/// Single-key operations hold the key's shard lock for their whole
/// read-modify-write, which is what makes `increment` and `set_if_absent`
/// atomic.
#[derive(Default)]
pub struct MemoryKvStore {
    map: DashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Shared by the in-process adapters.
pub(crate) fn next_value(key: &str, current: Option<&str>) -> Result<i64, StoreError> {
    let n = match current {
        None => 0,
        Some(v) => v
            .trim()
            .parse::<i64>()
            .map_err(|_| StoreError::Corrupt(format!("value at {key} is not an integer")))?,
    };
    n.checked_add(1)
        .ok_or_else(|| StoreError::Corrupt(format!("increment would overflow at {key}")))
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String) -> Result<bool, StoreError> {
        match self.map.entry(key.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.map.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.map.contains_key(key))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .map
            .iter()
            .filter(|e| glob_match(pattern, e.key()))
            .map(|e| e.key().clone())
            .collect())
    }

    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        match self.map.entry(key.to_string()) {
            Entry::Occupied(mut slot) => {
                let next = next_value(key, Some(slot.get()))?;
                slot.insert(next.to_string());
                Ok(next)
            }
            Entry::Vacant(slot) => {
                let next = next_value(key, None)?;
                slot.insert(next.to_string());
                Ok(next)
            }
        }
    }
}
