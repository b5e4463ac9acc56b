//! User preferences as an explicit value plus an injected persistence seam.

use crate::core::currency::{DEFAULT_CURRENCY, find_currency};
use crate::core::store::{KeyValueCollection, Store};
use crate::core::validation::ensure_user_id;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Currency amounts are displayed in.
    pub currency: String,
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            dark_mode: false,
        }
    }
}

impl Settings {
    pub fn with_currency(&self, code: &str) -> Result<Self> {
        let currency = find_currency(code).ok_or_else(|| anyhow!("Unsupported currency: {code}"))?;
        Ok(Self {
            currency: currency.code.to_string(),
            ..self.clone()
        })
    }

    pub fn with_dark_mode(&self, dark_mode: bool) -> Self {
        Self {
            dark_mode,
            ..self.clone()
        }
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns `None` when the user has never saved settings.
    async fn load(&self, user_id: &str) -> Result<Option<Settings>>;
    async fn save(&self, user_id: &str, settings: &Settings) -> Result<()>;
}

/// [`SettingsStore`] kept in the `settings` collection of a [`Store`], one entry per user.
pub struct StoreSettings {
    collection: Arc<dyn KeyValueCollection>,
}

impl StoreSettings {
    pub fn new(store: &dyn Store) -> Result<Self> {
        Ok(Self {
            collection: store.collection("settings")?,
        })
    }
}

#[async_trait]
impl SettingsStore for StoreSettings {
    async fn load(&self, user_id: &str) -> Result<Option<Settings>> {
        ensure_user_id(user_id)?;
        match self.collection.get(user_id).await? {
            Some(bytes) => {
                let settings = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Failed to decode settings for {user_id}"))?;
                Ok(Some(settings))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, user_id: &str, settings: &Settings) -> Result<()> {
        ensure_user_id(user_id)?;
        self.collection
            .put(user_id, serde_json::to_vec(settings)?)
            .await?;
        debug!("Saved settings for {user_id}: {settings:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyValueStore;

    #[test]
    fn test_with_currency_normalizes_code() {
        let settings = Settings::default().with_currency("eur").unwrap();
        assert_eq!(settings.currency, "EUR");
        assert!(!settings.dark_mode);
        assert!(Settings::default().with_currency("DOGE").is_err());
    }

    #[test]
    fn test_with_dark_mode_keeps_currency() {
        let settings = Settings::default()
            .with_currency("GBP")
            .unwrap()
            .with_dark_mode(true);
        assert_eq!(settings.currency, "GBP");
        assert!(settings.dark_mode);
    }

    #[tokio::test]
    async fn test_settings_round_trip_per_user() {
        let store = KeyValueStore::in_memory();
        let settings_store = StoreSettings::new(&store).unwrap();

        assert!(settings_store.load("alice").await.unwrap().is_none());

        let alice = Settings::default().with_currency("JPY").unwrap();
        settings_store.save("alice", &alice).await.unwrap();

        assert_eq!(settings_store.load("alice").await.unwrap(), Some(alice));
        assert!(settings_store.load("bob").await.unwrap().is_none());
    }
}
