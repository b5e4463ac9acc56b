//! Storage abstractions. Implementations live in `crate::store`.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A named collection of byte values keyed by string.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;
    /// Returns whether the key was present.
    async fn remove(&self, key: &str) -> Result<bool>;
    /// All entries whose key starts with `prefix`, in key order.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>>;
}

pub trait Store: Send + Sync {
    /// Opens the collection `name`, creating it on first use.
    fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>>;
}
