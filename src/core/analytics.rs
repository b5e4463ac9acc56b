//! Rollups over transactions, budget categories and goals.
//!
//! Every function here is pure and total: it never fails, does not depend on
//! anything but its inputs, and returns the same result when called twice on
//! the same collection.
use crate::core::budget::BudgetCategory;
use crate::core::currency::ExchangeRateTable;
use crate::core::goal::FinancialGoal;
use crate::core::transaction::{Transaction, TransactionType};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Net balance: income minus expenses.
pub fn balance<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> f64 {
    transactions.into_iter().map(Transaction::signed_amount).sum()
}

/// Sum of the amounts of every transaction of `kind`.
pub fn total_by_type<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    kind: TransactionType,
) -> f64 {
    transactions
        .into_iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount)
        .sum()
}

pub fn total_income<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> f64 {
    total_by_type(transactions, TransactionType::Income)
}

pub fn total_expense<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> f64 {
    total_by_type(transactions, TransactionType::Expense)
}

/// Transactions dated within `[start, end)`.
pub fn transactions_between(
    transactions: &[Transaction],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|t| t.date >= start && t.date < end)
        .collect()
}

/// UTC bounds `[first day, first day of next month)` of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?),
        Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0)?),
    ))
}

/// Transactions dated within the given calendar month. An invalid month yields nothing.
pub fn transactions_in_month(
    transactions: &[Transaction],
    year: i32,
    month: u32,
) -> Vec<&Transaction> {
    match month_bounds(year, month) {
        Some((start, end)) => transactions_between(transactions, start, end),
        None => Vec::new(),
    }
}

/// Expense totals grouped by category, in order of first appearance.
pub fn spending_by_category<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in transactions.into_iter().filter(|t| t.is_expense()) {
        let key = tx.category.to_lowercase();
        match index.get(&key) {
            Some(&i) => totals[i].1 += tx.amount,
            None => {
                index.insert(key, totals.len());
                totals.push((tx.category.clone(), tx.amount));
            }
        }
    }
    totals
}

/// Returns copies of `categories` whose spent amount is the total of the
/// matching expense transactions (by case-insensitive category name).
pub fn apply_spending<'a>(
    categories: &[BudgetCategory],
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<BudgetCategory> {
    let spending: HashMap<String, f64> = spending_by_category(transactions)
        .into_iter()
        .map(|(category, total)| (category.to_lowercase(), total))
        .collect();

    categories
        .iter()
        .map(|c| {
            let spent = spending
                .get(&c.name.to_lowercase())
                .copied()
                .unwrap_or(0.0);
            c.with_spent(spent)
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub used_percentage: f64,
    pub remaining: f64,
    pub over_budget_count: usize,
}

pub fn budget_summary(categories: &[BudgetCategory]) -> BudgetSummary {
    let total_budget: f64 = categories.iter().map(|c| c.budget_amount).sum();
    let total_spent: f64 = categories.iter().map(|c| c.spent_amount).sum();
    let used_percentage = if total_budget <= 0.0 {
        0.0
    } else {
        total_spent / total_budget * 100.0
    };

    BudgetSummary {
        total_budget,
        total_spent,
        used_percentage,
        remaining: total_budget - total_spent,
        over_budget_count: categories.iter().filter(|c| c.is_over_budget()).count(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoalSummary {
    pub total_saved: f64,
    pub total_target: f64,
    pub active_count: usize,
    pub completed_count: usize,
    pub average_progress: f64,
}

/// Rolls up goals. `average_progress` only considers active goals.
pub fn goal_summary(goals: &[FinancialGoal]) -> GoalSummary {
    let active: Vec<&FinancialGoal> = goals.iter().filter(|g| !g.is_completed).collect();
    let average_progress = if active.is_empty() {
        0.0
    } else {
        active.iter().map(|g| g.progress_percentage()).sum::<f64>() / active.len() as f64
    };

    GoalSummary {
        total_saved: goals.iter().map(|g| g.current_amount).sum(),
        total_target: goals.iter().map(|g| g.target_amount).sum(),
        active_count: active.len(),
        completed_count: goals.len() - active.len(),
        average_progress,
    }
}

/// Everything the dashboard shows, with amounts in `currency`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub currency: String,
    pub balance: f64,
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub budgets: BudgetSummary,
    pub goals: GoalSummary,
    pub recent_transactions: Vec<Transaction>,
}

/// Inputs of [`dashboard_summary`], all expressed in `ledger_currency`.
pub struct DashboardInput<'a> {
    pub transactions: &'a [Transaction],
    pub budgets: &'a [BudgetCategory],
    pub goals: &'a [FinancialGoal],
    pub ledger_currency: &'a str,
    pub now: DateTime<Utc>,
    pub recent_limit: usize,
}

/// Builds the dashboard for the month containing `input.now`, converting
/// every amount from the ledger currency to `display_currency`.
pub fn dashboard_summary(
    input: &DashboardInput<'_>,
    rates: &ExchangeRateTable,
    display_currency: &str,
) -> DashboardSummary {
    let to_display = |amount: f64| rates.convert(amount, input.ledger_currency, display_currency);

    let month = transactions_in_month(input.transactions, input.now.year(), input.now.month());

    let mut recent: Vec<Transaction> = input.transactions.to_vec();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(input.recent_limit);
    for tx in &mut recent {
        tx.amount = to_display(tx.amount);
    }

    let budgets = budget_summary(input.budgets);
    let goals = goal_summary(input.goals);

    DashboardSummary {
        currency: display_currency.to_string(),
        balance: to_display(balance(input.transactions)),
        monthly_income: to_display(total_income(month.iter().copied())),
        monthly_expense: to_display(total_expense(month.iter().copied())),
        budgets: BudgetSummary {
            total_budget: to_display(budgets.total_budget),
            total_spent: to_display(budgets.total_spent),
            remaining: to_display(budgets.remaining),
            ..budgets
        },
        goals: GoalSummary {
            total_saved: to_display(goals.total_saved),
            total_target: to_display(goals.total_target),
            ..goals
        },
        recent_transactions: recent,
    }
}
