use crate::core::cache::KeyValueCollection;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// Persistent collection stored in one fjall partition. Entries carry their
/// expiry; expired records are dropped (and deleted) on read.
///
/// Storage errors never fail the caller. A read error behaves like a miss
/// and a write error like a no-op, both logged at debug.
pub struct DiskCollection<K, V>
where
    K: Send + Sync + Serialize + Debug + 'static,
    V: Send + Sync + Serialize + DeserializeOwned + 'static,
{
    // Partitions stay usable only while their keyspace is alive.
    _keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V> DiskCollection<K, V>
where
    K: Send + Sync + Serialize + Debug,
    V: Send + Sync + Serialize + DeserializeOwned,
{
    /// Opens (or creates) the partition `name` in the keyspace at `path`.
    pub fn new(path: &Path, name: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open store partition '{name}'"))?;

        Ok(Self {
            _keyspace: keyspace,
            partition,
            _marker: PhantomData,
        })
    }
}

#[async_trait]
impl<K, V> KeyValueCollection<K, V> for DiskCollection<K, V>
where
    K: Send + Sync + Serialize + Debug + 'static,
    V: Send + Sync + Serialize + DeserializeOwned + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let res: Result<Option<V>> = (|| {
            if let Some(bytes) = self.partition.get(serde_json::to_vec(key)?)? {
                let entry: CacheEntry<V> = serde_json::from_slice(&bytes)?;
                if let Some(expires_at) = entry.expires_at {
                    if SystemTime::now() > expires_at {
                        debug!("Cache entry expired for key: {:?}", key);
                        self.partition.remove(serde_json::to_vec(key)?)?;
                        return Ok(None);
                    }
                }
                debug!("Cache HIT for key: {:?}", key);
                return Ok(Some(entry.value));
            }
            debug!("Cache MISS for key: {:?}", key);
            Ok(None)
        })();

        match res {
            Ok(value) => value,
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let res: Result<()> = (|| {
            let expires_at = ttl.map(|d| SystemTime::now() + d);
            let entry = CacheEntry { value, expires_at };
            self.partition
                .insert(serde_json::to_vec(&key)?, serde_json::to_vec(&entry)?)?;
            debug!("Cache PUT for key: {:?}", key);
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskCollection put error: {}", e);
        }
    }

    async fn remove(&self, key: &K) {
        let res: Result<()> = (|| {
            self.partition.remove(serde_json::to_vec(key)?)?;
            debug!("Cache REMOVE for key: {:?}", key);
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskCollection remove error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = DiskCollection::<String, i32>::new(dir.path(), "test").unwrap();

        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.put("key1".to_string(), 123, None).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = DiskCollection::<String, i32>::new(dir.path(), "test").unwrap();

        cache
            .put("key1".to_string(), 123, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_persists_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let cache = DiskCollection::<String, i32>::new(dir.path(), "test").unwrap();
            cache.put("key1".to_string(), 42, None).await;
        }

        let reopened = DiskCollection::<String, i32>::new(dir.path(), "test").unwrap();
        assert_eq!(reopened.get(&"key1".to_string()).await, Some(42));
    }

    #[tokio::test]
    async fn test_disk_cache_remove() {
        let dir = tempdir().unwrap();
        let cache = DiskCollection::<String, i32>::new(dir.path(), "test").unwrap();

        cache.put("key1".to_string(), 123, None).await;
        cache.remove(&"key1".to_string()).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
    }
}
