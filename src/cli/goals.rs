use super::{AppContext, ui};
use crate::core::analytics;
use crate::core::currency::format_amount;
use crate::core::goal::{FinancialGoal, GoalStatus};
use crate::core::view::ListViewModel;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use comfy_table::Cell;

const PROGRESS_WIDTH: usize = 20;

#[derive(Debug, Clone, Subcommand)]
pub enum GoalCommand {
    /// Create a savings goal
    Add {
        title: String,
        #[arg(short, long)]
        target: f64,
        /// Date the goal should be reached by, as YYYY-MM-DD
        #[arg(long)]
        target_date: NaiveDate,
        /// Amount already saved
        #[arg(long, default_value_t = 0.0)]
        current: f64,
        #[arg(long)]
        category: Option<String>,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List goals with their progress
    List,
    /// Add to (or with --remove, take from) a goal's saved amount
    Progress {
        id: String,
        amount: f64,
        #[arg(long)]
        remove: bool,
    },
    /// Change fields of an existing goal
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        target: Option<f64>,
        #[arg(long)]
        target_date: Option<NaiveDate>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a goal by id
    Delete { id: String },
}

pub async fn run(ctx: &AppContext, command: GoalCommand) -> Result<()> {
    let view = ListViewModel::new(ctx.goals.clone(), &ctx.user_id);
    let currency = ctx.ledger_currency();

    match command {
        GoalCommand::Add {
            title,
            target,
            target_date,
            current,
            category,
            description,
        } => {
            let goal = FinancialGoal::new(
                &title,
                &description,
                target,
                current,
                target_date,
                category.as_deref(),
            )?;
            view.add(&goal).await?;
            println!(
                "Added goal {} targeting {} by {} ({})",
                goal.title,
                format_amount(goal.target_amount, &currency),
                goal.target_date,
                goal.id
            );
        }
        GoalCommand::List => {
            let goals = view.load().await?;
            let theme = ctx.theme().await?;
            println!("{}", display_table(&goals, &currency, theme));
            let summary = analytics::goal_summary(&goals);
            println!(
                "\n{} {} of {} ({} active, {} completed)",
                ui::style_text("Saved:", ui::StyleType::TotalLabel),
                format_amount(summary.total_saved, &currency),
                format_amount(summary.total_target, &currency),
                summary.active_count,
                summary.completed_count
            );
        }
        GoalCommand::Progress { id, amount, remove } => {
            let goal = if remove {
                view.remove_progress(&id, amount).await?
            } else {
                view.add_progress(&id, amount).await?
            };
            println!(
                "{}: {} of {} {}",
                goal.title,
                format_amount(goal.current_amount, &currency),
                format_amount(goal.target_amount, &currency),
                ui::progress_bar_text(goal.progress_percentage(), PROGRESS_WIDTH)
            );
            if goal.status() == GoalStatus::Completed {
                println!("{}", ui::style_text("Goal completed!", ui::StyleType::TotalValue));
            }
        }
        GoalCommand::Update {
            id,
            title,
            description,
            target,
            target_date,
            category,
        } => {
            let mut goal = ctx.goals.fetch(&ctx.user_id, &id).await?;
            if let Some(title) = title {
                goal.title = title.trim().to_string();
            }
            if let Some(description) = description {
                goal.description = description.trim().to_string();
            }
            if let Some(target_date) = target_date {
                goal.target_date = target_date;
            }
            if let Some(category) = category {
                goal.category = category.trim().to_string();
            }
            if let Some(target) = target {
                goal = goal.with_target(target)?;
            }
            goal.validate()?;
            view.update(&goal).await?;
            println!("Updated goal {id} ({})", goal.status());
        }
        GoalCommand::Delete { id } => {
            if !view.delete(&id).await? {
                bail!("No goal with id {id}");
            }
            println!("Deleted goal {id}");
        }
    }
    Ok(())
}

pub fn display_table(goals: &[FinancialGoal], currency: &str, theme: ui::Theme) -> String {
    let mut table = theme.table(&[
        "Goal", "Category", "Saved", "Target", "Progress", "Due", "Status", "Id",
    ]);
    for goal in goals {
        table.add_row(vec![
            Cell::new(&goal.title),
            Cell::new(&goal.category),
            theme.amount_cell(goal.current_amount, currency, false),
            theme.amount_cell(goal.target_amount, currency, false),
            Cell::new(ui::progress_bar_text(goal.progress_percentage(), PROGRESS_WIDTH)),
            Cell::new(goal.target_date),
            theme.flag_cell(goal.is_completed, "Completed", "Active"),
            Cell::new(ui::style_text(&goal.id, ui::StyleType::Subtle)),
        ]);
    }
    table.to_string()
}
