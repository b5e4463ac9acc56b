//! Exchange-rate snapshots: fetched on request, persisted for offline use and
//! refetched once they are older than the configured maximum age.

use crate::core::currency::{ExchangeRateProvider, ExchangeRateTable};
use crate::core::store::{KeyValueCollection, Store};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_MAX_AGE_HOURS: i64 = 24;

pub struct RateService {
    provider: Arc<dyn ExchangeRateProvider>,
    snapshots: Arc<dyn KeyValueCollection>,
    max_age: TimeDelta,
}

impl RateService {
    pub fn new(provider: Arc<dyn ExchangeRateProvider>, store: &dyn Store) -> Result<Self> {
        Ok(Self {
            provider,
            snapshots: store.collection("exchange_rates")?,
            max_age: TimeDelta::hours(DEFAULT_MAX_AGE_HOURS),
        })
    }

    pub fn with_max_age(self, max_age: TimeDelta) -> Self {
        Self { max_age, ..self }
    }

    /// Fetches a new table for `base` and stores it as the latest snapshot.
    /// Failures are returned as-is; nothing is retried.
    pub async fn refresh(&self, base: &str) -> Result<ExchangeRateTable> {
        let base = base.to_uppercase();
        let table = self
            .provider
            .fetch_rates(&base)
            .await
            .with_context(|| format!("Failed to refresh exchange rates for {base}"))?;
        self.snapshots
            .put(&base, serde_json::to_vec(&table)?)
            .await?;
        info!("Stored {} exchange rates for {base}", table.rates.len());
        Ok(table)
    }

    /// The last stored snapshot for `base`, if any.
    pub async fn latest(&self, base: &str) -> Result<Option<ExchangeRateTable>> {
        let base = base.to_uppercase();
        match self.snapshots.get(&base).await? {
            Some(bytes) => Ok(Some(
                serde_json::from_slice(&bytes)
                    .with_context(|| format!("Failed to decode stored rates for {base}"))?,
            )),
            None => Ok(None),
        }
    }

    /// A snapshot without a fetch time is always stale.
    pub fn is_stale(&self, table: &ExchangeRateTable, now: DateTime<Utc>) -> bool {
        match table.fetched_at {
            Some(fetched_at) => now.signed_duration_since(fetched_at) > self.max_age,
            None => true,
        }
    }

    /// Best table available for display: a fresh stored snapshot, otherwise a
    /// new fetch, otherwise the stale snapshot, otherwise an empty table so
    /// conversions fall back to parity.
    pub async fn resolve(&self, base: &str) -> ExchangeRateTable {
        self.resolve_at(base, Utc::now()).await
    }

    async fn resolve_at(&self, base: &str, now: DateTime<Utc>) -> ExchangeRateTable {
        let stored = match self.latest(base).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Ignoring unreadable stored rates: {e:#}");
                None
            }
        };

        match stored {
            Some(table) if !self.is_stale(&table, now) => {
                debug!("Using stored exchange rates for {base}");
                table
            }
            stale => match self.refresh(base).await {
                Ok(table) => table,
                Err(e) => match stale {
                    Some(table) => {
                        warn!("Exchange rates unavailable, using stale snapshot: {e:#}");
                        table
                    }
                    None => {
                        warn!("Exchange rates unavailable, amounts shown at parity: {e:#}");
                        ExchangeRateTable::empty(base)
                    }
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyValueStore;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockRateProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockRateProvider {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl ExchangeRateProvider for MockRateProvider {
        async fn fetch_rates(&self, base: &str) -> Result<ExchangeRateTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("service unavailable"));
            }
            Ok(ExchangeRateTable::new(
                base,
                HashMap::from([("EUR".to_string(), 0.85)]),
            ))
        }
    }

    #[tokio::test]
    async fn test_refresh_stores_snapshot() {
        let store = KeyValueStore::in_memory();
        let provider = MockRateProvider::new(false);
        let service = RateService::new(provider.clone(), &store).unwrap();

        assert!(service.latest("USD").await.unwrap().is_none());
        let table = service.refresh("usd").await.unwrap();
        assert_eq!(service.latest("USD").await.unwrap(), Some(table));
    }

    #[tokio::test]
    async fn test_resolve_prefers_stored_snapshot() {
        let store = KeyValueStore::in_memory();
        let provider = MockRateProvider::new(false);
        let service = RateService::new(provider.clone(), &store).unwrap();

        service.resolve("USD").await;
        service.resolve("USD").await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    async fn store_snapshot(store: &KeyValueStore, table: &ExchangeRateTable) {
        store
            .collection("exchange_rates")
            .unwrap()
            .put(&table.base, serde_json::to_vec(table).unwrap())
            .await
            .unwrap();
    }

    fn year_old_table() -> ExchangeRateTable {
        let mut table =
            ExchangeRateTable::new("USD", HashMap::from([("EUR".to_string(), 0.5)]));
        table.fetched_at = Some(Utc::now() - TimeDelta::days(365));
        table
    }

    #[tokio::test]
    async fn test_resolve_refetches_stale_snapshot() {
        let store = KeyValueStore::in_memory();
        store_snapshot(&store, &year_old_table()).await;
        let provider = MockRateProvider::new(false);
        let service = RateService::new(provider.clone(), &store)
            .unwrap()
            .with_max_age(TimeDelta::hours(24));

        let table = service.resolve("USD").await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(table.rate("EUR"), Some(0.85));
        assert_eq!(service.latest("USD").await.unwrap(), Some(table));
    }

    #[tokio::test]
    async fn test_resolve_keeps_stale_snapshot_when_refetch_fails() {
        let store = KeyValueStore::in_memory();
        let old = year_old_table();
        store_snapshot(&store, &old).await;
        let provider = MockRateProvider::new(true);
        let service = RateService::new(provider.clone(), &store).unwrap();

        let table = service.resolve("USD").await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(table, old);
    }

    #[test]
    fn test_is_stale() {
        let store = KeyValueStore::in_memory();
        let service = RateService::new(MockRateProvider::new(false), &store)
            .unwrap()
            .with_max_age(TimeDelta::hours(6));
        let now = Utc::now();
        let mut table = ExchangeRateTable::empty("USD");
        assert!(service.is_stale(&table, now));
        table.fetched_at = Some(now - TimeDelta::hours(5));
        assert!(!service.is_stale(&table, now));
        table.fetched_at = Some(now - TimeDelta::hours(7));
        assert!(service.is_stale(&table, now));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_parity() {
        let store = KeyValueStore::in_memory();
        let provider = MockRateProvider::new(true);
        let service = RateService::new(provider.clone(), &store).unwrap();

        assert!(service.refresh("USD").await.is_err());
        let table = service.resolve("USD").await;
        assert!(table.is_empty());
        assert_eq!(table.convert(100.0, "USD", "EUR"), 100.0);
    }
}
