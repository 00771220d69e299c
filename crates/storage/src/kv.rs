use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use shared::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Asynchronous string key-value store.
///
/// Values are whole documents: `set` replaces the previous value entirely.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written or was removed
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key; removing a missing key succeeds
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile store, used in tests and when no durable backend is available
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.data.write().await.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::Storage(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        debug!("Opened file store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        // Rename over the old file so readers never see a half-written document
        tokio::fs::write(&tmp, value).await.map_err(|e| {
            Error::Storage(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            Error::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Redis-backed store, keys are namespaced under `prefix`
#[derive(Clone)]
pub struct RedisStore {
    client: Arc<Mutex<redis::aio::ConnectionManager>>,
    prefix: String,
}

impl RedisStore {
    pub async fn new(redis_url: &str, prefix: impl Into<String>) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| Error::Storage(format!("Failed to connect to Redis: {}", e)))?;

        let connection_manager = client
            .get_connection_manager()
            .await
            .map_err(|e| Error::Storage(format!("Failed to get connection manager: {}", e)))?;

        Ok(Self {
            client: Arc::new(Mutex::new(connection_manager)),
            prefix: prefix.into(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.namespaced(key);
        let mut conn = self.client.lock().await;

        conn.get::<_, Option<String>>(&key)
            .await
            .map_err(|e| Error::Storage(format!("Failed to get {}: {}", key, e)))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = self.namespaced(key);
        let mut conn = self.client.lock().await;

        conn.set::<_, _, ()>(&key, value)
            .await
            .map_err(|e| Error::Storage(format!("Failed to set {}: {}", key, e)))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = self.namespaced(key);
        let mut conn = self.client.lock().await;

        conn.del::<_, ()>(&key)
            .await
            .map_err(|e| Error::Storage(format!("Failed to delete {}: {}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wallet-lookup-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_in_memory_set_get_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = scratch_dir("reopen");
        let store = FileStore::open(&dir).await.unwrap();
        store.set("wallet-preferences", r#"{"favorites":["A"]}"#).await.unwrap();

        let reopened = FileStore::open(&dir).await.unwrap();
        assert_eq!(
            reopened.get("wallet-preferences").await.unwrap(),
            Some(r#"{"favorites":["A"]}"#.to_string())
        );

        reopened.remove("wallet-preferences").await.unwrap();
        assert_eq!(reopened.get("wallet-preferences").await.unwrap(), None);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_file_store_missing_key_and_odd_names() {
        let dir = scratch_dir("odd-names");
        let store = FileStore::open(&dir).await.unwrap();

        assert_eq!(store.get("never-written").await.unwrap(), None);
        store.remove("never-written").await.unwrap();

        store.set("../escape/attempt", "x").await.unwrap();
        assert!(store.path_for("../escape/attempt").starts_with(&dir));
        assert_eq!(store.get("../escape/attempt").await.unwrap(), Some("x".to_string()));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    #[ignore] // Only run with PREFERENCES_REDIS_URL set
    async fn test_redis_store_round_trip() {
        let url = std::env::var("PREFERENCES_REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let store = RedisStore::new(&url, "wallet-lookup-test").await.unwrap();

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
