use super::{AppContext, ui};
use crate::core::analytics;
use crate::core::currency::format_amount;
use crate::core::transaction::{Transaction, TransactionType};
use crate::core::view::ListViewModel;
use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use clap::Subcommand;
use comfy_table::Cell;

#[derive(Debug, Clone, Subcommand)]
pub enum TransactionCommand {
    /// Record a new transaction
    Add {
        description: String,
        amount: f64,
        /// income or expense
        #[arg(short, long, default_value = "expense")]
        kind: TransactionType,
        #[arg(long, default_value = "General")]
        category: String,
        /// Date as YYYY-MM-DD, defaults to now
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List transactions, optionally for one month
    List {
        /// Month as YYYY-MM
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Change fields of an existing transaction
    Update {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        kind: Option<TransactionType>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a transaction by id
    Delete { id: String },
}

fn to_timestamp(date: NaiveDate) -> Result<chrono::DateTime<Utc>> {
    match date.and_hms_opt(12, 0, 0) {
        Some(dt) => Ok(Utc.from_utc_datetime(&dt)),
        None => bail!("Invalid date: {date}"),
    }
}

/// Parses `YYYY-MM` into a year and month.
pub fn parse_month(value: &str) -> Result<(i32, u32)> {
    let parsed = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d");
    match parsed {
        Ok(date) => Ok((date.year(), date.month())),
        Err(_) => bail!("Invalid month {value}, expected YYYY-MM"),
    }
}

pub async fn run(ctx: &AppContext, command: TransactionCommand) -> Result<()> {
    let view = ListViewModel::new(ctx.transactions.clone(), &ctx.user_id);
    let currency = ctx.ledger_currency();

    match command {
        TransactionCommand::Add {
            description,
            amount,
            kind,
            category,
            date,
            notes,
        } => {
            let date = match date {
                Some(d) => to_timestamp(d)?,
                None => Utc::now(),
            };
            let tx = Transaction::new(&description, amount, &category, date, kind, notes)?;
            view.add(&tx).await?;
            println!("Added {} {} ({})", kind, format_amount(tx.amount, &currency), tx.id);
        }
        TransactionCommand::List { month } => {
            let all = view.load().await?;
            let selected: Vec<&Transaction> = match month {
                Some(m) => {
                    let (year, month) = parse_month(&m)?;
                    analytics::transactions_in_month(&all, year, month)
                }
                None => all.iter().collect(),
            };
            let theme = ctx.theme().await?;
            println!("{}", display_table(&selected, &currency, theme));
            println!(
                "\nIncome: {}  Expenses: {}  Balance: {}",
                format_amount(analytics::total_income(selected.iter().copied()), &currency),
                format_amount(analytics::total_expense(selected.iter().copied()), &currency),
                ui::style_text(
                    &format_amount(analytics::balance(selected.iter().copied()), &currency),
                    ui::StyleType::TotalValue
                )
            );
        }
        TransactionCommand::Update {
            id,
            description,
            amount,
            kind,
            category,
            date,
            notes,
        } => {
            let mut tx = ctx.transactions.fetch(&ctx.user_id, &id).await?;
            if let Some(description) = description {
                tx.description = description.trim().to_string();
            }
            if let Some(amount) = amount {
                tx.amount = amount;
            }
            if let Some(kind) = kind {
                tx.kind = kind;
            }
            if let Some(category) = category {
                tx.category = category.trim().to_string();
            }
            if let Some(date) = date {
                tx.date = to_timestamp(date)?;
            }
            if let Some(notes) = notes {
                tx.notes = Some(notes).filter(|n| !n.trim().is_empty());
            }
            tx.validate()?;
            view.update(&tx).await?;
            println!("Updated transaction {id}");
        }
        TransactionCommand::Delete { id } => {
            if !view.delete(&id).await? {
                bail!("No transaction with id {id}");
            }
            println!("Deleted transaction {id}");
        }
    }
    Ok(())
}

pub fn display_table(transactions: &[&Transaction], currency: &str, theme: ui::Theme) -> String {
    let mut table = theme.table(&["Date", "Description", "Category", "Type", "Amount", "Id"]);
    for tx in transactions {
        table.add_row(vec![
            Cell::new(tx.date.format("%Y-%m-%d")),
            Cell::new(&tx.description),
            Cell::new(&tx.category),
            Cell::new(tx.kind),
            theme.amount_cell(tx.signed_amount(), currency, true),
            Cell::new(ui::style_text(&tx.id, ui::StyleType::Subtle)),
        ]);
    }
    table.to_string()
}
