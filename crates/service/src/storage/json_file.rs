use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use super::{memory::next_value, pattern::glob_match, KvStore, StoreError};

/// Key-value store persisted as one JSON object in a file.
///
/// The whole map lives in memory. A mutation is applied to a copy, written to
/// the file, and only then swapped in under the write lock, so a failed save
/// leaves both the map and the file untouched.
pub struct JsonFileKvStore {
    inner: RwLock<HashMap<String, String>>,
    file_path: PathBuf,
}

fn io_err(e: std::io::Error) -> StoreError {
    StoreError::Connection(e.to_string())
}

impl JsonFileKvStore {
    /// Load the store from `path`, creating an empty file if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let map: HashMap<String, String> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Corrupt(format!("{}: {e}", file_path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&file_path, b"{}").await.map_err(io_err)?;
                HashMap::new()
            }
            Err(e) => return Err(io_err(e)),
        };
        debug!(path = %file_path.display(), keys = map.len(), "json file store loaded");

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    async fn save(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        let data = serde_json::to_vec(map).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.file_path.with_extension("tmp");
        fs::write(&tmp, data).await.map_err(io_err)?;
        fs::rename(&tmp, &self.file_path).await.map_err(io_err)
    }
}

#[async_trait]
impl KvStore for JsonFileKvStore {
    async fn ping(&self) -> Result<(), StoreError> {
        fs::metadata(&self.file_path).await.map(|_| ()).map_err(io_err)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        next.insert(key.to_string(), value);
        self.save(&next).await?;
        *map = next;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String) -> Result<bool, StoreError> {
        let mut map = self.inner.write().await;
        if map.contains_key(key) {
            return Ok(false);
        }
        let mut next = map.clone();
        next.insert(key.to_string(), value);
        self.save(&next).await?;
        *map = next;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut map = self.inner.write().await;
        if !map.contains_key(key) {
            return Ok(false);
        }
        let mut next = map.clone();
        next.remove(key);
        self.save(&next).await?;
        *map = next;
        Ok(true)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.contains_key(key))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let map = self.inner.read().await;
        Ok(map.keys().filter(|k| glob_match(pattern, k)).cloned().collect())
    }

    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let mut map = self.inner.write().await;
        let value = next_value(key, map.get(key).map(String::as_str))?;
        let mut next = map.clone();
        next.insert(key.to_string(), value.to_string());
        self.save(&next).await?;
        *map = next;
        Ok(value)
    }
}
