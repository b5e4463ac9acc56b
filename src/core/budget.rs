use super::repository::Record;
use super::validation::{ensure_amount, ensure_not_blank};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_BUDGET_COLOR: &str = "#4CAF50";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub id: String,
    pub name: String,
    pub budget_amount: f64,
    #[serde(default)]
    pub spent_amount: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_BUDGET_COLOR.to_string()
}

impl BudgetCategory {
    pub fn new(name: &str, budget_amount: f64, color: Option<&str>) -> Result<Self> {
        let category = Self {
            id: Uuid::now_v7().to_string(),
            name: name.trim().to_string(),
            budget_amount,
            spent_amount: 0.0,
            color: color.map_or_else(default_color, str::to_string),
        };
        category.validate()?;
        Ok(category)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_not_blank("Budget name", &self.name)?;
        ensure_amount("Budget amount", self.budget_amount)?;
        ensure_amount("Spent amount", self.spent_amount)
    }

    /// Returns a copy with `spent_amount` replaced.
    pub fn with_spent(&self, spent_amount: f64) -> Self {
        Self {
            spent_amount,
            ..self.clone()
        }
    }

    pub fn remaining(&self) -> f64 {
        self.budget_amount - self.spent_amount
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent_amount > self.budget_amount
    }

    /// Share of the budget already spent, as a percentage. Zero for empty budgets.
    pub fn used_percentage(&self) -> f64 {
        if self.budget_amount <= 0.0 {
            return 0.0;
        }
        self.spent_amount / self.budget_amount * 100.0
    }
}

impl Record for BudgetCategory {
    const COLLECTION: &'static str = "budgets";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_and_over_budget() {
        let groceries = BudgetCategory::new("Groceries", 400.0, None)
            .unwrap()
            .with_spent(250.0);
        assert_eq!(groceries.remaining(), 150.0);
        assert!(!groceries.is_over_budget());
        assert_eq!(groceries.used_percentage(), 62.5);
        assert_eq!(groceries.color, DEFAULT_BUDGET_COLOR);

        let dining = BudgetCategory::new("Dining", 100.0, Some("#FF5722"))
            .unwrap()
            .with_spent(120.0);
        assert_eq!(dining.remaining(), -20.0);
        assert!(dining.is_over_budget());
    }

    #[test]
    fn test_zero_budget_has_zero_usage() {
        let empty = BudgetCategory::new("Misc", 0.0, None)
            .unwrap()
            .with_spent(30.0);
        assert_eq!(empty.used_percentage(), 0.0);
        assert!(empty.is_over_budget());
    }

    #[test]
    fn test_rejects_invalid_budget() {
        assert!(BudgetCategory::new(" ", 10.0, None).is_err());
        assert!(BudgetCategory::new("Rent", -1.0, None).is_err());
    }
}
