use std::sync::Arc;

use async_trait::async_trait;
use models::counter::Model as Counter;

use crate::errors::ServiceError;
use crate::storage::KvStore;

/// Counter persistence. Names are already validated by the caller.
#[async_trait]
pub trait CounterRepository: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<Counter>, ServiceError>;
    /// All counters ordered by name.
    async fn list(&self) -> Result<Vec<Counter>, ServiceError>;
    /// Create at zero unless the name is taken; returns whether it created.
    async fn insert_if_absent(&self, name: &str) -> Result<bool, ServiceError>;
    /// Atomically add one; `None` when the counter does not exist.
    async fn increment(&self, name: &str) -> Result<Option<Counter>, ServiceError>;
    /// Set back to zero; `None` when the counter does not exist.
    async fn reset(&self, name: &str) -> Result<Option<Counter>, ServiceError>;
    async fn delete(&self, name: &str) -> Result<bool, ServiceError>;
    async fn remove_all(&self) -> Result<u64, ServiceError>;
}

const PREFIX: &str = "counter:";
const KEY_PATTERN: &str = "counter:*";

fn counter_key(name: &str) -> String {
    format!("{PREFIX}{name}")
}

/// Counters as decimal text under `counter:{name}`.
///
/// Increment and reset check existence and then write, so a delete landing
/// between the two can leave a counter recreated at 1 or 0. Creation itself
/// is exact through the store's conditional set.
pub struct KvCounterRepository {
    kv: Arc<dyn KvStore>,
}

impl KvCounterRepository {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl CounterRepository for KvCounterRepository {
    async fn get(&self, name: &str) -> Result<Option<Counter>, ServiceError> {
        match self.kv.get(&counter_key(name)).await? {
            Some(text) => Ok(Some(Counter::from_store_text(name, &text)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Counter>, ServiceError> {
        let mut counters = Vec::new();
        for key in self.kv.keys(KEY_PATTERN).await? {
            let Some(name) = key.strip_prefix(PREFIX) else { continue };
            if let Some(counter) = self.get(name).await? {
                counters.push(counter);
            }
        }
        counters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(counters)
    }

    async fn insert_if_absent(&self, name: &str) -> Result<bool, ServiceError> {
        Ok(self.kv.set_if_absent(&counter_key(name), Counter::new(name).to_store_text()).await?)
    }

    async fn increment(&self, name: &str) -> Result<Option<Counter>, ServiceError> {
        let key = counter_key(name);
        if !self.kv.exists(&key).await? {
            return Ok(None);
        }
        let count = self.kv.increment(&key).await?;
        Ok(Some(Counter { name: name.to_string(), count }))
    }

    async fn reset(&self, name: &str) -> Result<Option<Counter>, ServiceError> {
        let key = counter_key(name);
        if !self.kv.exists(&key).await? {
            return Ok(None);
        }
        let counter = Counter::new(name);
        self.kv.set(&key, counter.to_store_text()).await?;
        Ok(Some(counter))
    }

    async fn delete(&self, name: &str) -> Result<bool, ServiceError> {
        Ok(self.kv.delete(&counter_key(name)).await?)
    }

    async fn remove_all(&self) -> Result<u64, ServiceError> {
        let mut removed = 0;
        for key in self.kv.keys(KEY_PATTERN).await? {
            if self.kv.delete(&key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
