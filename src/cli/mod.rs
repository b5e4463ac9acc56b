//! Presentation layer: one module per command group.

pub mod budgets;
pub mod convert;
pub mod dashboard;
pub mod goals;
pub mod rates;
pub mod settings;
pub mod setup;
pub mod transactions;
pub mod ui;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::rates::RateService;
use crate::core::settings::{Settings, SettingsStore, StoreSettings};
use crate::core::store::Store;
use crate::core::validation::ensure_user_id;
use crate::core::{BudgetCategory, FinancialGoal, Repository, Transaction};
use crate::providers::exchange_rate_api::ExchangeRateApiProvider;
use crate::store::KeyValueStore;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const RATE_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Everything a command needs, wired from the config. The store is opened
/// once here and its collections are shared by every repository.
pub struct AppContext {
    pub config: AppConfig,
    pub user_id: String,
    pub transactions: Repository<Transaction>,
    pub budgets: Repository<BudgetCategory>,
    pub goals: Repository<FinancialGoal>,
    pub settings_store: Arc<dyn SettingsStore>,
    pub rates: RateService,
}

impl AppContext {
    pub fn new(config: AppConfig, user_override: Option<&str>) -> Result<Self> {
        let data_path = config.default_data_path()?;
        let store: Arc<dyn Store> = Arc::new(KeyValueStore::open(&data_path)?);
        Self::with_store(config, user_override, store)
    }

    /// Builds a context over an already constructed store.
    pub fn with_store(
        config: AppConfig,
        user_override: Option<&str>,
        store: Arc<dyn Store>,
    ) -> Result<Self> {
        config.validate()?;
        let user_id = user_override.unwrap_or(config.user_id()).to_string();
        ensure_user_id(&user_id)?;
        debug!("Running as user {user_id}");

        let rate_cache = Arc::new(Cache::with_ttl(RATE_CACHE_TTL));
        let provider = Arc::new(ExchangeRateApiProvider::new(
            config.exchange_rates_url(),
            rate_cache,
        ));

        Ok(Self {
            transactions: Repository::new(store.as_ref())?,
            budgets: Repository::new(store.as_ref())?,
            goals: Repository::new(store.as_ref())?,
            settings_store: Arc::new(StoreSettings::new(store.as_ref())?),
            rates: RateService::new(provider, store.as_ref())?
                .with_max_age(config.rates_max_age()),
            user_id,
            config,
        })
    }

    /// The user's saved settings, or defaults that display in the ledger currency.
    pub async fn settings(&self) -> Result<Settings> {
        let saved = self.settings_store.load(&self.user_id).await?;
        Ok(saved.unwrap_or_else(|| Settings {
            currency: self.config.currency.to_uppercase(),
            ..Settings::default()
        }))
    }

    pub fn ledger_currency(&self) -> String {
        self.config.currency.to_uppercase()
    }

    pub async fn theme(&self) -> Result<ui::Theme> {
        Ok(ui::Theme::new(self.settings().await?.dark_mode))
    }
}
