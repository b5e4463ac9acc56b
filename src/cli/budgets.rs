use super::{AppContext, ui};
use crate::core::analytics;
use crate::core::budget::BudgetCategory;
use crate::core::currency::format_amount;
use crate::core::view::ListViewModel;
use anyhow::{Result, bail};
use chrono::{Datelike, Utc};
use clap::Subcommand;
use comfy_table::Cell;

#[derive(Debug, Clone, Subcommand)]
pub enum BudgetCommand {
    /// Create a budget category
    Add {
        name: String,
        amount: f64,
        /// Hex color used by graphical front ends
        #[arg(long)]
        color: Option<String>,
    },
    /// List budget categories with their usage
    List,
    /// Change fields of an existing category
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        spent: Option<f64>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category by id
    Delete { id: String },
    /// Recompute spent amounts from this month's expenses
    Sync,
}

pub async fn run(ctx: &AppContext, command: BudgetCommand) -> Result<()> {
    let view = ListViewModel::new(ctx.budgets.clone(), &ctx.user_id);
    let currency = ctx.ledger_currency();

    match command {
        BudgetCommand::Add {
            name,
            amount,
            color,
        } => {
            let category = BudgetCategory::new(&name, amount, color.as_deref())?;
            view.add(&category).await?;
            println!(
                "Added budget {} of {} ({})",
                category.name,
                format_amount(category.budget_amount, &currency),
                category.id
            );
        }
        BudgetCommand::List => {
            let categories = view.load().await?;
            let theme = ctx.theme().await?;
            println!("{}", display_table(&categories, &currency, theme));
            print_totals(&categories, &currency);
        }
        BudgetCommand::Update {
            id,
            name,
            amount,
            spent,
            color,
        } => {
            let mut category = ctx.budgets.fetch(&ctx.user_id, &id).await?;
            if let Some(name) = name {
                category.name = name.trim().to_string();
            }
            if let Some(amount) = amount {
                category.budget_amount = amount;
            }
            if let Some(spent) = spent {
                category.spent_amount = spent;
            }
            if let Some(color) = color {
                category.color = color.trim().to_string();
            }
            category.validate()?;
            view.update(&category).await?;
            println!("Updated budget {id}");
        }
        BudgetCommand::Delete { id } => {
            if !view.delete(&id).await? {
                bail!("No budget with id {id}");
            }
            println!("Deleted budget {id}");
        }
        BudgetCommand::Sync => {
            let now = Utc::now();
            let transactions = ctx.transactions.list(&ctx.user_id).await?;
            let month = analytics::transactions_in_month(&transactions, now.year(), now.month());
            let categories = view.sync_spending(&month).await?;
            let theme = ctx.theme().await?;
            println!("{}", display_table(&categories, &currency, theme));
            print_totals(&categories, &currency);
        }
    }
    Ok(())
}

fn print_totals(categories: &[BudgetCategory], currency: &str) {
    let summary = analytics::budget_summary(categories);
    println!(
        "\n{} {} of {} ({:.1}%), {} over budget",
        ui::style_text("Spent:", ui::StyleType::TotalLabel),
        format_amount(summary.total_spent, currency),
        format_amount(summary.total_budget, currency),
        summary.used_percentage,
        summary.over_budget_count
    );
}

pub fn display_table(categories: &[BudgetCategory], currency: &str, theme: ui::Theme) -> String {
    let mut table = theme.table(&["Category", "Budget", "Spent", "Remaining", "Used", "Over", "Id"]);
    for category in categories {
        table.add_row(vec![
            Cell::new(&category.name),
            theme.amount_cell(category.budget_amount, currency, false),
            theme.amount_cell(category.spent_amount, currency, false),
            theme.amount_cell(category.remaining(), currency, true),
            theme.percentage_cell(category.used_percentage(), 100.0),
            theme.flag_cell(category.is_over_budget(), "yes", "no"),
            Cell::new(ui::style_text(&category.id, ui::StyleType::Subtle)),
        ]);
    }
    table.to_string()
}
