use super::AppContext;
use anyhow::Result;
use clap::{Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SettingsCommand {
    /// Show the current settings
    Show,
    /// Set the display currency
    Currency { code: String },
    /// Turn dark mode on or off
    DarkMode { mode: Toggle },
}

pub async fn run(ctx: &AppContext, command: SettingsCommand) -> Result<()> {
    let current = ctx.settings().await?;
    let updated = match command {
        SettingsCommand::Show => {
            println!("User:             {}", ctx.user_id);
            println!("Ledger currency:  {}", ctx.ledger_currency());
            println!("Display currency: {}", current.currency);
            println!(
                "Dark mode:        {}",
                if current.dark_mode { "on" } else { "off" }
            );
            return Ok(());
        }
        SettingsCommand::Currency { code } => current.with_currency(&code)?,
        SettingsCommand::DarkMode { mode } => current.with_dark_mode(mode == Toggle::On),
    };

    ctx.settings_store.save(&ctx.user_id, &updated).await?;
    println!(
        "Saved settings: currency {}, dark mode {}",
        updated.currency,
        if updated.dark_mode { "on" } else { "off" }
    );
    Ok(())
}
