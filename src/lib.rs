pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::AppContext;
use crate::cli::budgets::BudgetCommand;
use crate::cli::goals::GoalCommand;
use crate::cli::rates::RatesCommand;
use crate::cli::settings::SettingsCommand;
use crate::cli::transactions::TransactionCommand;
use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Dashboard,
    Transaction(TransactionCommand),
    Budget(BudgetCommand),
    Goal(GoalCommand),
    Rates(RatesCommand),
    Convert {
        amount: f64,
        from: String,
        to: String,
        strict: bool,
    },
    Settings(SettingsCommand),
}

/// Loads the config, opens the store and runs one command against it.
pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    user: Option<&str>,
) -> Result<()> {
    info!("fintrack starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ctx = AppContext::new(config, user)?;
    match command {
        AppCommand::Dashboard => cli::dashboard::run(&ctx).await,
        AppCommand::Transaction(cmd) => cli::transactions::run(&ctx, cmd).await,
        AppCommand::Budget(cmd) => cli::budgets::run(&ctx, cmd).await,
        AppCommand::Goal(cmd) => cli::goals::run(&ctx, cmd).await,
        AppCommand::Rates(cmd) => cli::rates::run(&ctx, cmd).await,
        AppCommand::Convert {
            amount,
            from,
            to,
            strict,
        } => cli::convert::run(&ctx, amount, &from, &to, strict).await,
        AppCommand::Settings(cmd) => cli::settings::run(&ctx, cmd).await,
    }
}
