use super::{AppContext, ui};
use crate::core::analytics::DashboardSummary;
use crate::core::currency::format_amount;
use crate::core::view::DashboardViewModel;
use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;
use tracing::{debug, info};

pub async fn run(ctx: &AppContext) -> Result<()> {
    let settings = ctx.settings().await?;
    let ledger = ctx.ledger_currency();
    let rates = ctx.rates.resolve(&ledger).await;
    debug!(
        "Dashboard in {} from ledger {ledger} with {} rates",
        settings.currency,
        rates.rates.len()
    );

    let view = DashboardViewModel::new(
        ctx.transactions.clone(),
        ctx.budgets.clone(),
        ctx.goals.clone(),
        &ctx.user_id,
        &ledger,
        ctx.config.recent_transactions,
    );
    let summary = view.refresh(&settings, &rates, Utc::now()).await?;
    info!("Dashboard for {}: {}", ctx.user_id, headline(&summary));
    println!("{}", render(&summary, ui::Theme::new(settings.dark_mode)));
    Ok(())
}

/// Renders the overview, budget, goal and recent transaction sections.
pub fn render(summary: &DashboardSummary, theme: ui::Theme) -> String {
    let currency = summary.currency.as_str();
    let mut out = String::new();

    out.push_str(&ui::style_text("Overview", ui::StyleType::Title));
    out.push('\n');
    let mut overview = theme.table(&["Balance", "Income (month)", "Expenses (month)"]);
    overview.add_row(vec![
        theme.amount_cell(summary.balance, currency, true),
        theme.amount_cell(summary.monthly_income, currency, false),
        theme.amount_cell(summary.monthly_expense, currency, false),
    ]);
    out.push_str(&overview.to_string());

    out.push_str("\n\n");
    out.push_str(&ui::style_text("Budgets", ui::StyleType::Title));
    out.push('\n');
    let budgets = &summary.budgets;
    let mut budget_table = theme.table(&["Budgeted", "Spent", "Remaining", "Used", "Over budget"]);
    budget_table.add_row(vec![
        theme.amount_cell(budgets.total_budget, currency, false),
        theme.amount_cell(budgets.total_spent, currency, false),
        theme.amount_cell(budgets.remaining, currency, true),
        theme.percentage_cell(budgets.used_percentage, 100.0),
        Cell::new(budgets.over_budget_count),
    ]);
    out.push_str(&budget_table.to_string());

    out.push_str("\n\n");
    out.push_str(&ui::style_text("Goals", ui::StyleType::Title));
    out.push('\n');
    let goals = &summary.goals;
    let mut goal_table = theme.table(&["Saved", "Target", "Average progress", "Active", "Completed"]);
    goal_table.add_row(vec![
        theme.amount_cell(goals.total_saved, currency, false),
        theme.amount_cell(goals.total_target, currency, false),
        Cell::new(ui::progress_bar_text(goals.average_progress, 20)),
        Cell::new(goals.active_count),
        Cell::new(goals.completed_count),
    ]);
    out.push_str(&goal_table.to_string());

    out.push_str("\n\n");
    out.push_str(&ui::style_text("Recent transactions", ui::StyleType::Title));
    out.push('\n');
    if summary.recent_transactions.is_empty() {
        out.push_str(&ui::style_text("No transactions yet", ui::StyleType::Subtle));
    } else {
        let mut recent = theme.table(&["Date", "Description", "Category", "Amount"]);
        for tx in &summary.recent_transactions {
            recent.add_row(vec![
                Cell::new(tx.date.format("%Y-%m-%d")),
                Cell::new(&tx.description),
                Cell::new(&tx.category),
                theme.amount_cell(tx.signed_amount(), currency, true),
            ]);
        }
        out.push_str(&recent.to_string());
    }
    out
}

/// One-line summary used in logs and by scripts.
pub fn headline(summary: &DashboardSummary) -> String {
    format!(
        "balance {} | income {} | expenses {}",
        format_amount(summary.balance, &summary.currency),
        format_amount(summary.monthly_income, &summary.currency),
        format_amount(summary.monthly_expense, &summary.currency)
    )
}
