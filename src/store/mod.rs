pub mod disk;
pub mod memory;

use crate::core::store::{KeyValueCollection, Store};
use anyhow::{Context, Result, anyhow};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::debug;

/// A thread-safe key-value store that can hold multiple collections, either
/// in memory or persisted to a fjall keyspace on disk.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// A store whose collections vanish when it is dropped.
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    /// Opens (or creates) a persistent store rooted at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path.join("store"))
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        debug!("Opened store at {}", path.display());

        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: Some(Arc::new(keyspace)),
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.keyspace.is_some()
    }

    fn create_collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
        match &self.keyspace {
            Some(keyspace) => {
                let partition = keyspace
                    .open_partition(name, PartitionCreateOptions::default())
                    .with_context(|| format!("Failed to open partition {name}"))?;
                Ok(Arc::new(DiskCollection::new(Arc::clone(keyspace), partition)))
            }
            None => Ok(Arc::new(MemoryCollection::new())),
        }
    }
}

impl Store for KeyValueStore {
    fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
        {
            let collections = self
                .collections
                .read()
                .map_err(|_| anyhow!("Store lock poisoned"))?;
            if let Some(collection) = collections.get(name) {
                return Ok(Arc::clone(collection));
            }
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow!("Store lock poisoned"))?;
        if let Some(collection) = collections.get(name) {
            return Ok(Arc::clone(collection));
        }
        let collection = self.create_collection(name)?;
        collections.insert(name.to_string(), Arc::clone(&collection));
        debug!("Created collection {name}");
        Ok(collection)
    }
}
