//! View-state holders: load data through repositories, recompute rollups and
//! publish immutable snapshots for the presentation layer.

use crate::core::analytics::{self, DashboardInput, DashboardSummary};
use crate::core::budget::BudgetCategory;
use crate::core::currency::ExchangeRateTable;
use crate::core::goal::FinancialGoal;
use crate::core::repository::{Record, Repository};
use crate::core::settings::Settings;
use crate::core::state::StateHolder;
use crate::core::transaction::Transaction;
use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

/// Records of one kind for one user, republished after every change.
pub struct ListViewModel<T: Record + PartialEq> {
    repository: Repository<T>,
    user_id: String,
    state: StateHolder<Vec<T>>,
}

impl<T: Record + PartialEq> ListViewModel<T> {
    pub fn new(repository: Repository<T>, user_id: &str) -> Self {
        Self {
            repository,
            user_id: user_id.to_string(),
            state: StateHolder::new(Vec::new()),
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.state.subscribe()
    }

    pub async fn load(&self) -> Result<Vec<T>> {
        let items = self.repository.list(&self.user_id).await?;
        self.state.publish(items.clone());
        Ok(items)
    }

    pub async fn add(&self, item: &T) -> Result<()> {
        self.repository.insert(&self.user_id, item).await?;
        self.load().await?;
        Ok(())
    }

    pub async fn update(&self, item: &T) -> Result<()> {
        self.repository.update(&self.user_id, item).await?;
        self.load().await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.repository.delete(&self.user_id, id).await?;
        if removed {
            self.load().await?;
        }
        Ok(removed)
    }
}

impl ListViewModel<FinancialGoal> {
    pub async fn add_progress(&self, id: &str, amount: f64) -> Result<FinancialGoal> {
        let goal = self.repository.fetch(&self.user_id, id).await?;
        let updated = goal.add_progress(amount)?;
        self.update(&updated).await?;
        Ok(updated)
    }

    pub async fn remove_progress(&self, id: &str, amount: f64) -> Result<FinancialGoal> {
        let goal = self.repository.fetch(&self.user_id, id).await?;
        let updated = goal.remove_progress(amount)?;
        self.update(&updated).await?;
        Ok(updated)
    }
}

impl ListViewModel<BudgetCategory> {
    /// Recomputes every category's spent amount from `transactions` and saves it.
    pub async fn sync_spending(&self, transactions: &[&Transaction]) -> Result<Vec<BudgetCategory>> {
        let categories = self.repository.list(&self.user_id).await?;
        let updated = analytics::apply_spending(&categories, transactions.iter().copied());
        for category in updated.iter().filter(|c| !categories.contains(c)) {
            self.repository.update(&self.user_id, category).await?;
        }
        self.state.publish(updated.clone());
        Ok(updated)
    }
}

/// Dashboard rollup for one user.
pub struct DashboardViewModel {
    transactions: Repository<Transaction>,
    budgets: Repository<BudgetCategory>,
    goals: Repository<FinancialGoal>,
    user_id: String,
    ledger_currency: String,
    recent_limit: usize,
    state: StateHolder<DashboardSummary>,
}

impl DashboardViewModel {
    pub fn new(
        transactions: Repository<Transaction>,
        budgets: Repository<BudgetCategory>,
        goals: Repository<FinancialGoal>,
        user_id: &str,
        ledger_currency: &str,
        recent_limit: usize,
    ) -> Self {
        Self {
            transactions,
            budgets,
            goals,
            user_id: user_id.to_string(),
            ledger_currency: ledger_currency.to_string(),
            recent_limit,
            state: StateHolder::default(),
        }
    }

    pub fn summary(&self) -> DashboardSummary {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSummary> {
        self.state.subscribe()
    }

    /// Reloads all three collections concurrently and publishes a new summary.
    pub async fn refresh(
        &self,
        settings: &Settings,
        rates: &ExchangeRateTable,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary> {
        let (transactions, budgets, goals) = futures::try_join!(
            self.transactions.list(&self.user_id),
            self.budgets.list(&self.user_id),
            self.goals.list(&self.user_id),
        )?;
        debug!(
            "Dashboard inputs for {}: {} transactions, {} budgets, {} goals",
            self.user_id,
            transactions.len(),
            budgets.len(),
            goals.len()
        );

        let input = DashboardInput {
            transactions: &transactions,
            budgets: &budgets,
            goals: &goals,
            ledger_currency: &self.ledger_currency,
            now,
            recent_limit: self.recent_limit,
        };
        let summary = analytics::dashboard_summary(&input, rates, &settings.currency);
        self.state.publish(summary.clone());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::TransactionType;
    use crate::store::KeyValueStore;
    use chrono::{NaiveDate, TimeZone};
    use std::collections::HashMap;

    fn vacation() -> FinancialGoal {
        FinancialGoal::new(
            "Vacation",
            "Japan trip",
            5000.0,
            3200.0,
            NaiveDate::from_ymd_opt(2027, 4, 1).unwrap(),
            Some("Travel"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_goal_progress_is_persisted_and_published() {
        let store = KeyValueStore::in_memory();
        let goals = ListViewModel::new(Repository::<FinancialGoal>::new(&store).unwrap(), "alice");
        let mut rx = goals.subscribe();

        let goal = vacation();
        goals.add(&goal).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        let done = goals.add_progress(&goal.id, 1800.0).await.unwrap();
        assert!(done.is_completed);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update()[0].is_completed);

        let reopened = goals.remove_progress(&goal.id, 50.0).await.unwrap();
        assert_eq!(reopened.current_amount, 4950.0);
        assert!(!goals.items()[0].is_completed);

        assert!(goals.add_progress("missing", 1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_republishes() {
        let store = KeyValueStore::in_memory();
        let goals = ListViewModel::new(Repository::<FinancialGoal>::new(&store).unwrap(), "alice");
        let goal = vacation();
        goals.add(&goal).await.unwrap();

        assert!(goals.delete(&goal.id).await.unwrap());
        assert!(goals.items().is_empty());
        assert!(!goals.delete(&goal.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_sync_spending_updates_budgets() {
        let store = KeyValueStore::in_memory();
        let budgets =
            ListViewModel::new(Repository::<BudgetCategory>::new(&store).unwrap(), "alice");
        let food = BudgetCategory::new("Food", 300.0, None).unwrap();
        budgets.add(&food).await.unwrap();

        let lunch = Transaction::new(
            "Lunch",
            12.5,
            "food",
            Utc::now(),
            TransactionType::Expense,
            None,
        )
        .unwrap();
        let updated = budgets.sync_spending(&[&lunch]).await.unwrap();
        assert_eq!(updated[0].spent_amount, 12.5);

        let reloaded = budgets.load().await.unwrap();
        assert_eq!(reloaded[0].spent_amount, 12.5);
    }

    #[tokio::test]
    async fn test_dashboard_refresh_publishes_summary() {
        let store = KeyValueStore::in_memory();
        let transactions = Repository::<Transaction>::new(&store).unwrap();
        let budgets = Repository::<BudgetCategory>::new(&store).unwrap();
        let goals = Repository::<FinancialGoal>::new(&store).unwrap();

        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let salary = Transaction::new(
            "Salary",
            1000.0,
            "Work",
            now,
            TransactionType::Income,
            None,
        )
        .unwrap();
        transactions.insert("alice", &salary).await.unwrap();
        goals.insert("alice", &vacation()).await.unwrap();
        // another user's data is not part of the rollup
        transactions.insert("bob", &salary).await.unwrap();

        let dashboard = DashboardViewModel::new(transactions, budgets, goals, "alice", "USD", 5);
        let rx = dashboard.subscribe();

        let rates = ExchangeRateTable::new("USD", HashMap::from([("EUR".to_string(), 0.8)]));
        let settings = Settings::default().with_currency("EUR").unwrap();
        let summary = dashboard.refresh(&settings, &rates, now).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(summary.currency, "EUR");
        assert_eq!(summary.balance, 800.0);
        assert_eq!(summary.monthly_income, 800.0);
        assert_eq!(summary.goals.active_count, 1);
        assert_eq!(summary.goals.total_saved, 2560.0);
        assert_eq!(dashboard.summary(), summary);
    }
}
