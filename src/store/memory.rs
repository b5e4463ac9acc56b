use crate::core::store::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection backed by an ordered map.
pub struct MemoryCollection {
    inner: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let map = self.inner.lock().await;
        let value = map.get(key).cloned();
        debug!("Memory GET {key}: {}", if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut map = self.inner.lock().await;
        debug!("Memory PUT {key}");
        map.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut map = self.inner.lock().await;
        debug!("Memory REMOVE {key}");
        Ok(map.remove(key).is_some())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let map = self.inner.lock().await;
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_put_remove() {
        let collection = MemoryCollection::new();

        // Initially, collection is empty
        assert!(collection.get("key1").await.unwrap().is_none());

        collection.put("key1", vec![1, 2, 3]).await.unwrap();
        assert_eq!(collection.get("key1").await.unwrap(), Some(vec![1, 2, 3]));

        assert!(collection.remove("key1").await.unwrap());
        assert!(!collection.remove("key1").await.unwrap());
        assert!(collection.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_prefix_is_ordered_and_bounded() {
        let collection = MemoryCollection::new();
        collection.put("bob/1", vec![9]).await.unwrap();
        collection.put("alice/2", vec![2]).await.unwrap();
        collection.put("alice/1", vec![1]).await.unwrap();
        collection.put("alice2/1", vec![7]).await.unwrap();

        let entries = collection.scan_prefix("alice/").await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["alice/1", "alice/2"]);
    }
}
