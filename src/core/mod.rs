//! Core business logic: entities, rollups, conversion and storage abstractions

pub mod analytics;
pub mod budget;
pub mod cache;
pub mod config;
pub mod currency;
pub mod goal;
pub mod log;
pub mod rates;
pub mod repository;
pub mod settings;
pub mod state;
pub mod store;
pub mod transaction;
pub mod validation;
pub mod view;

// Re-export main types for cleaner imports
pub use budget::BudgetCategory;
pub use currency::{ExchangeRateProvider, ExchangeRateTable};
pub use goal::{FinancialGoal, GoalStatus};
pub use repository::{Record, Repository};
pub use settings::{Settings, SettingsStore};
pub use transaction::{Transaction, TransactionType};
