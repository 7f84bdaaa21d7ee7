//! Test doubles for store failure paths.

use async_trait::async_trait;

use super::{KvStore, StoreError};

/// A store whose backend is gone: every call fails with a connection error.
#[derive(Default)]
pub struct OfflineKvStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Connection("store offline".into()))
}

#[async_trait]
impl KvStore for OfflineKvStore {
    async fn ping(&self) -> Result<(), StoreError> {
        offline()
    }
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        offline()
    }
    async fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
        offline()
    }
    async fn set_if_absent(&self, _key: &str, _value: String) -> Result<bool, StoreError> {
        offline()
    }
    async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        offline()
    }
    async fn exists(&self, _key: &str) -> Result<bool, StoreError> {
        offline()
    }
    async fn keys(&self, _pattern: &str) -> Result<Vec<String>, StoreError> {
        offline()
    }
    async fn increment(&self, _key: &str) -> Result<i64, StoreError> {
        offline()
    }
}
