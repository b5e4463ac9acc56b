use super::{AppContext, ui};
use crate::core::currency::{ExchangeRateTable, SUPPORTED_CURRENCIES};
use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, CellAlignment};

#[derive(Debug, Clone, Subcommand)]
pub enum RatesCommand {
    /// Fetch the latest rates and store them for offline use
    Refresh {
        /// Base currency, defaults to the ledger currency
        #[arg(short, long)]
        base: Option<String>,
    },
    /// Show the stored rates for the supported currencies
    Show {
        #[arg(short, long)]
        base: Option<String>,
    },
}

pub async fn run(ctx: &AppContext, command: RatesCommand) -> Result<()> {
    match command {
        RatesCommand::Refresh { base } => {
            let base = base.unwrap_or_else(|| ctx.ledger_currency()).to_uppercase();
            let spinner = ui::new_spinner(&format!("Fetching exchange rates for {base}..."));
            let result = ctx.rates.refresh(&base).await;
            spinner.finish_and_clear();
            let table = result?;
            println!("Stored {} rates for {}", table.rates.len(), table.base);
            println!("{}", display_table(&table, ctx.theme().await?));
        }
        RatesCommand::Show { base } => {
            let base = base.unwrap_or_else(|| ctx.ledger_currency()).to_uppercase();
            match ctx.rates.latest(&base).await? {
                Some(table) => println!("{}", display_table(&table, ctx.theme().await?)),
                None => println!(
                    "No stored rates for {base}. Run `fintrack rates refresh` first."
                ),
            }
        }
    }
    Ok(())
}

pub fn display_table(table: &ExchangeRateTable, theme: ui::Theme) -> String {
    let mut out = theme.table(&["Currency", "Name", "Rate"]);
    for currency in SUPPORTED_CURRENCIES {
        let rate = match table.rate(currency.code) {
            Some(rate) => format!("{rate:.4}"),
            None => "n/a".to_string(),
        };
        out.add_row(vec![
            Cell::new(currency.code),
            Cell::new(currency.name),
            Cell::new(rate).set_alignment(CellAlignment::Right),
        ]);
    }
    let fetched = match table.fetched_at {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "never".to_string(),
    };
    format!("Base {} (as of {fetched})\n{out}", table.base)
}
