//! Per-user CRUD over a [`Store`] collection.

use crate::core::store::{KeyValueCollection, Store};
use crate::core::validation::ensure_user_id;
use anyhow::{Context, Result, bail};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// An independently addressable entity stored in its own collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

pub struct Repository<T: Record> {
    collection: Arc<dyn KeyValueCollection>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: &dyn Store) -> Result<Self> {
        let collection = store
            .collection(T::COLLECTION)
            .with_context(|| format!("Failed to open collection {}", T::COLLECTION))?;
        Ok(Self {
            collection,
            _marker: PhantomData,
        })
    }

    fn key(user_id: &str, id: &str) -> String {
        format!("{user_id}/{id}")
    }

    fn decode(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes)
            .with_context(|| format!("Failed to decode record from {}", T::COLLECTION))
    }

    /// Every record owned by `user_id`, oldest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<T>> {
        ensure_user_id(user_id)?;
        let entries = self.collection.scan_prefix(&format!("{user_id}/")).await?;
        debug!(
            "Loaded {} records from {} for {user_id}",
            entries.len(),
            T::COLLECTION
        );
        entries.iter().map(|(_, value)| Self::decode(value)).collect()
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Option<T>> {
        ensure_user_id(user_id)?;
        match self.collection.get(&Self::key(user_id, id)).await? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like [`Repository::get`] but fails when the record does not exist.
    pub async fn fetch(&self, user_id: &str, id: &str) -> Result<T> {
        self.get(user_id, id)
            .await?
            .with_context(|| format!("No record {id} in {}", T::COLLECTION))
    }

    pub async fn insert(&self, user_id: &str, record: &T) -> Result<()> {
        ensure_user_id(user_id)?;
        let key = Self::key(user_id, record.id());
        if self.collection.get(&key).await?.is_some() {
            bail!("Record {} already exists in {}", record.id(), T::COLLECTION);
        }
        self.collection.put(&key, serde_json::to_vec(record)?).await?;
        debug!("Inserted {key} into {}", T::COLLECTION);
        Ok(())
    }

    pub async fn update(&self, user_id: &str, record: &T) -> Result<()> {
        ensure_user_id(user_id)?;
        let key = Self::key(user_id, record.id());
        if self.collection.get(&key).await?.is_none() {
            bail!("No record {} in {}", record.id(), T::COLLECTION);
        }
        self.collection.put(&key, serde_json::to_vec(record)?).await?;
        debug!("Updated {key} in {}", T::COLLECTION);
        Ok(())
    }

    /// Returns whether a record was deleted.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        ensure_user_id(user_id)?;
        let removed = self.collection.remove(&Self::key(user_id, id)).await?;
        debug!("Delete {user_id}/{id} from {}: {removed}", T::COLLECTION);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::budget::BudgetCategory;
    use crate::core::goal::FinancialGoal;
    use crate::store::KeyValueStore;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    async fn exercise_crud(store: &dyn Store) {
        let repo = Repository::<BudgetCategory>::new(store).unwrap();
        let food = BudgetCategory::new("Food", 400.0, None).unwrap();
        let rent = BudgetCategory::new("Rent", 1200.0, None).unwrap();

        repo.insert("alice", &food).await.unwrap();
        repo.insert("alice", &rent).await.unwrap();
        assert!(repo.insert("alice", &food).await.is_err());

        let listed = repo.list("alice").await.unwrap();
        assert_eq!(listed, vec![food.clone(), rent.clone()]);
        assert!(repo.list("bob").await.unwrap().is_empty());

        let spent = food.with_spent(120.0);
        repo.update("alice", &spent).await.unwrap();
        assert_eq!(repo.fetch("alice", &food.id).await.unwrap().spent_amount, 120.0);

        // other users cannot see or touch the record
        assert!(repo.get("bob", &food.id).await.unwrap().is_none());
        assert!(repo.update("bob", &spent).await.is_err());

        assert!(repo.delete("alice", &rent.id).await.unwrap());
        assert!(!repo.delete("alice", &rent.id).await.unwrap());
        assert_eq!(repo.list("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_crud_in_memory() {
        let store = KeyValueStore::in_memory();
        exercise_crud(&store).await;
    }

    #[tokio::test]
    async fn test_crud_on_disk() {
        let dir = tempdir().unwrap();
        let store = KeyValueStore::open(dir.path()).unwrap();
        exercise_crud(&store).await;
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let goal = FinancialGoal::new(
            "House",
            "Deposit",
            60000.0,
            12000.0,
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            None,
        )
        .unwrap();

        {
            let store = KeyValueStore::open(dir.path()).unwrap();
            let repo = Repository::<FinancialGoal>::new(&store).unwrap();
            repo.insert("alice", &goal).await.unwrap();
        }

        let store = KeyValueStore::open(dir.path()).unwrap();
        let repo = Repository::<FinancialGoal>::new(&store).unwrap();
        assert_eq!(repo.fetch("alice", &goal.id).await.unwrap(), goal);
    }

    #[tokio::test]
    async fn test_rejects_invalid_user() {
        let store = KeyValueStore::in_memory();
        let repo = Repository::<BudgetCategory>::new(&store).unwrap();
        assert!(repo.list("").await.is_err());
        assert!(repo.list("a/b").await.is_err());
    }
}
