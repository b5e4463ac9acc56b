use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fintrack::cli::budgets::BudgetCommand;
use fintrack::cli::goals::GoalCommand;
use fintrack::cli::rates::RatesCommand;
use fintrack::cli::settings::SettingsCommand;
use fintrack::cli::setup::setup;
use fintrack::cli::transactions::TransactionCommand;
use fintrack::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Act as this user instead of the one in the configuration
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fintrack::AppCommand {
    fn from(cmd: Commands) -> fintrack::AppCommand {
        match cmd {
            Commands::Dashboard => fintrack::AppCommand::Dashboard,
            Commands::Transaction(c) => fintrack::AppCommand::Transaction(c),
            Commands::Budget(c) => fintrack::AppCommand::Budget(c),
            Commands::Goal(c) => fintrack::AppCommand::Goal(c),
            Commands::Rates(c) => fintrack::AppCommand::Rates(c),
            Commands::Convert {
                amount,
                from,
                to,
                strict,
            } => fintrack::AppCommand::Convert {
                amount,
                from,
                to,
                strict,
            },
            Commands::Settings(c) => fintrack::AppCommand::Settings(c),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show balance, monthly totals, budgets, goals and recent activity
    Dashboard,
    /// Manage income and expense transactions
    #[command(subcommand)]
    Transaction(TransactionCommand),
    /// Manage budget categories
    #[command(subcommand)]
    Budget(BudgetCommand),
    /// Manage savings goals
    #[command(subcommand)]
    Goal(GoalCommand),
    /// Fetch or inspect exchange rates
    #[command(subcommand)]
    Rates(RatesCommand),
    /// Convert an amount between currencies
    Convert {
        amount: f64,
        from: String,
        to: String,
        /// Fail instead of assuming parity for unknown currencies
        #[arg(long)]
        strict: bool,
    },
    /// Show or change user settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => {
            fintrack::run_command(cmd.into(), cli.config_path.as_deref(), cli.user.as_deref())
                .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
