use crate::core::currency::{DEFAULT_CURRENCY, find_currency};
use crate::providers::exchange_rate_api::DEFAULT_BASE_URL;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_USER: &str = "default";
const DEFAULT_RECENT_TRANSACTIONS: usize = 5;
const DEFAULT_RATES_MAX_AGE_HOURS: u64 = 24;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub exchange_rates: Option<ExchangeRateProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchange_rates: Some(ExchangeRateProviderConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Ledger currency: the currency amounts are recorded in.
    #[serde(default = "default_currency")]
    pub currency: String,
    pub user: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
    #[serde(default = "default_recent_transactions")]
    pub recent_transactions: usize,
    /// Stored rate tables older than this are refetched before use.
    #[serde(default = "default_rates_max_age_hours")]
    pub rates_max_age_hours: u64,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_recent_transactions() -> usize {
    DEFAULT_RECENT_TRANSACTIONS
}

fn default_rates_max_age_hours() -> u64 {
    DEFAULT_RATES_MAX_AGE_HOURS
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            currency: default_currency(),
            user: None,
            providers: ProvidersConfig::default(),
            data_path: None,
            recent_transactions: DEFAULT_RECENT_TRANSACTIONS,
            rates_max_age_hours: DEFAULT_RATES_MAX_AGE_HOURS,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or the defaults when no
    /// config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fintrack", "fintrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "fintrack", "fintrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Rejects a ledger currency we cannot format or convert.
    pub fn validate(&self) -> Result<()> {
        if find_currency(&self.currency).is_none() {
            bail!("Unsupported ledger currency in config: {}", self.currency);
        }
        Ok(())
    }

    pub fn rates_max_age(&self) -> chrono::TimeDelta {
        i64::try_from(self.rates_max_age_hours)
            .ok()
            .and_then(chrono::TimeDelta::try_hours)
            .unwrap_or(chrono::TimeDelta::MAX)
    }

    pub fn user_id(&self) -> &str {
        self.user.as_deref().unwrap_or(DEFAULT_USER)
    }

    pub fn exchange_rates_url(&self) -> &str {
        self.providers
            .exchange_rates
            .as_ref()
            .map_or(DEFAULT_BASE_URL, |p| &p.base_url)
    }
}
