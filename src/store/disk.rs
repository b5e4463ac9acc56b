use crate::core::store::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::debug;

/// Collection persisted as a fjall partition. Writes are synced before returning.
pub struct DiskCollection {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn sync(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.partition.get(key)?.map(|v| v.to_vec());
        debug!("Disk GET {key}: {}", if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.partition.insert(key, value)?;
        self.sync()?;
        debug!("Disk PUT {key}");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        if !self.partition.contains_key(key)? {
            return Ok(false);
        }
        self.partition.remove(key)?;
        self.sync()?;
        debug!("Disk REMOVE {key}");
        Ok(true)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let mut entries = Vec::new();
        for item in self.partition.prefix(prefix) {
            let (key, value) = item?;
            entries.push((String::from_utf8_lossy(&key).into_owned(), value.to_vec()));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::Store;
    use crate::store::KeyValueStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_get_put_remove() {
        let dir = tempdir().unwrap();
        let store = KeyValueStore::open(dir.path()).unwrap();
        let collection = store.collection("test").unwrap();

        assert!(collection.get("key1").await.unwrap().is_none());

        collection.put("key1", b"123".to_vec()).await.unwrap();
        assert_eq!(collection.get("key1").await.unwrap(), Some(b"123".to_vec()));

        assert!(collection.remove("key1").await.unwrap());
        assert!(!collection.remove("key1").await.unwrap());
        assert!(collection.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disk_scan_prefix() {
        let dir = tempdir().unwrap();
        let store = KeyValueStore::open(dir.path()).unwrap();
        let collection = store.collection("test").unwrap();

        collection.put("alice/b", b"2".to_vec()).await.unwrap();
        collection.put("alice/a", b"1".to_vec()).await.unwrap();
        collection.put("bob/a", b"3".to_vec()).await.unwrap();

        let entries = collection.scan_prefix("alice/").await.unwrap();
        assert_eq!(
            entries,
            vec![
                ("alice/a".to_string(), b"1".to_vec()),
                ("alice/b".to_string(), b"2".to_vec()),
            ]
        );
    }
}
